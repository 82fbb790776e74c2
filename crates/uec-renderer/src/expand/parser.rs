//! Expression syntax parsing.
//!
//! Finds `{{ name(args) }}` and `{{ name }}` expressions within a line. The
//! delimiters are configurable.

use crate::args::{is_identifier, is_identifier_char};
use crate::{MacroArgs, MacroError};

/// Parsed expression body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expression {
    /// Macro call: `name(args)`
    Call { name: String, args: MacroArgs },
    /// Variable lookup: `name`
    Variable(String),
}

/// An expression located in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located<'a> {
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// Text between the delimiters.
    pub body: &'a str,
}

/// Find the first complete expression in `line`.
///
/// Returns `None` if there is no opening delimiter or it is never closed on
/// this line. A closing delimiter inside a quoted argument does not count,
/// unless the quote is never terminated: then the first closing delimiter
/// ends the body and parsing reports the bad string.
pub(crate) fn find_expression<'a>(line: &'a str, open: &str, close: &str) -> Option<Located<'a>> {
    let start = line.find(open)?;
    let body_start = start + open.len();
    let after_open = &line[body_start..];
    let body_len = find_close(after_open, close).or_else(|| after_open.find(close))?;
    let body_end = body_start + body_len;

    Some(Located {
        start,
        end: body_end + close.len(),
        body: &line[body_start..body_end],
    })
}

/// Offset of `close` in `s`, skipping quoted strings.
fn find_close(s: &str, close: &str) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if s[i..].starts_with(close) {
                    return Some(i);
                }
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
            }
        }
    }

    None
}

/// Parse the text between the delimiters.
pub(crate) fn parse_expression(body: &str) -> Result<Expression, MacroError> {
    let body = body.trim();
    let name_end = body
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);

    if !is_identifier(name) {
        return Err(MacroError::Syntax(format!(
            "expected a macro or variable name, found `{body}`"
        )));
    }

    let rest = rest.trim_start();
    if rest.is_empty() {
        return Ok(Expression::Variable(name.to_owned()));
    }

    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| MacroError::Syntax(format!("expected `{name}(...)`, found `{body}`")))?;

    Ok(Expression::Call {
        name: name.to_owned(),
        args: MacroArgs::parse(inner)?,
    })
}
