//! Macro expansion for Markdown sources.
//!
//! Expressions are written between `variable_start` and `variable_end`
//! (`{{` and `}}` by default):
//!
//! - `{{ name(arg, key=value) }}` calls the macro registered as `name`
//! - `{{ name }}` inserts the string variable `name`
//!
//! Expressions must open and close on the same line. Fenced code blocks are
//! left alone unless `render_in_code_blocks` is set.

mod fence;
mod parser;
mod processor;

pub use processor::{ExpandError, MacroExpander};
