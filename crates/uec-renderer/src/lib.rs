//! Markdown macro host.
//!
//! This crate provides the pieces a documentation build needs to run
//! Markdown macros:
//!
//! - [`Environment`]: build-scoped variables and named macros
//! - [`MacroExpander`]: replaces `{{ ... }}` expressions in Markdown
//! - [`Build`]: expands a list of pages in order and renders them to HTML
//!
//! Plugins are plain functions that receive the [`Environment`] once per
//! build and register their macros on it.
//!
//! # Example
//!
//! ```
//! use uec_config::Config;
//! use uec_renderer::{Build, Environment, Page};
//!
//! fn define_env(env: &mut Environment) {
//!     env.variables_mut().insert("hits", 0_u32);
//!     env.register_macro("hit", |vars, _| {
//!         let hits = vars.get_mut::<u32>("hits")?;
//!         *hits += 1;
//!         Ok(hits.to_string())
//!     });
//! }
//!
//! let build = Build::new(Config::default()).with_plugin(define_env);
//! let pages = build
//!     .run(&[Page::new("a.md", "{{ hit() }}, {{ hit() }}")])
//!     .unwrap();
//! assert_eq!(pages[0].markdown, "1, 2");
//! ```

mod args;
mod build;
mod environment;
pub mod expand;
pub mod front_matter;

pub use args::MacroArgs;
pub use build::{Build, BuildError, Page, Plugin, RenderedPage};
pub use environment::{Environment, MacroError, MacroFn, Variables};
pub use expand::{ExpandError, MacroExpander};
