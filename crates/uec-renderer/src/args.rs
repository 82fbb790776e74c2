//! Macro argument parsing.
//!
//! Parses the `("label", text='caption', 3)` argument list of a macro call.

use std::collections::HashMap;

use crate::MacroError;

/// Parsed arguments of a macro call.
///
/// Positional arguments must come before keyword arguments. Values are
/// either quoted (`"..."` or `'...'`, where a backslash escapes the next
/// character) or bare tokens such as `42` or `draft`.
///
/// # Example
///
/// ```
/// use uec_renderer::MacroArgs;
///
/// let args = MacroArgs::parse(r#""fail1", text='Lock failures'"#).unwrap();
/// assert_eq!(args.positional, vec!["fail1"]);
/// assert_eq!(args.require(0, "label").unwrap(), "fail1");
/// assert_eq!(args.require(1, "text").unwrap(), "Lock failures");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MacroArgs {
    /// Positional arguments in call order.
    pub positional: Vec<String>,
    /// Keyword arguments: `name=value`.
    pub keyword: HashMap<String, String>,
}

impl MacroArgs {
    /// Build arguments from positional values.
    #[must_use]
    pub fn positional<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: HashMap::new(),
        }
    }

    /// Parse the text between the parentheses of a call.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::Syntax` for unterminated strings, missing commas,
    /// empty arguments, duplicate keywords, or a positional argument after a
    /// keyword argument.
    pub fn parse(input: &str) -> Result<Self, MacroError> {
        let mut args = Self::default();
        let mut remaining = input.trim_start();

        while !remaining.is_empty() {
            let (key, rest) = split_keyword(remaining);
            let (value, rest) = parse_value(rest)?;

            match key {
                Some(key) => {
                    if args.keyword.insert(key.to_owned(), value).is_some() {
                        return Err(MacroError::Syntax(format!(
                            "duplicate keyword argument `{key}`"
                        )));
                    }
                }
                None if !args.keyword.is_empty() => {
                    return Err(MacroError::Syntax(
                        "positional argument follows keyword argument".to_owned(),
                    ));
                }
                None => args.positional.push(value),
            }

            remaining = rest.trim_start();
            if let Some(after_comma) = remaining.strip_prefix(',') {
                remaining = after_comma.trim_start();
            } else if !remaining.is_empty() {
                return Err(MacroError::Syntax(format!(
                    "expected `,` before `{remaining}`"
                )));
            }
        }

        Ok(args)
    }

    /// Get an argument by keyword, falling back to its position.
    #[must_use]
    pub fn get(&self, position: usize, name: &str) -> Option<&str> {
        self.keyword
            .get(name)
            .or_else(|| self.positional.get(position))
            .map(String::as_str)
    }

    /// Get a required argument by keyword or position.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::MissingArgument` if the argument was not passed.
    pub fn require(&self, position: usize, name: &str) -> Result<&str, MacroError> {
        self.get(position, name)
            .ok_or_else(|| MacroError::MissingArgument {
                name: name.to_owned(),
                position,
            })
    }

    /// Check the call against a macro's parameter list.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::TooManyArguments` if more positional arguments
    /// were passed than `params` has, and `MacroError::UnexpectedKeyword`
    /// for keywords that are not in `params`.
    pub fn check_params(&self, params: &[&str]) -> Result<(), MacroError> {
        if self.positional.len() > params.len() {
            return Err(MacroError::TooManyArguments {
                expected: params.len(),
                found: self.positional.len(),
            });
        }

        // Sorted for a deterministic error on multiple bad keywords
        let mut keys: Vec<_> = self.keyword.keys().collect();
        keys.sort();
        if let Some(key) = keys.into_iter().find(|k| !params.contains(&k.as_str())) {
            return Err(MacroError::UnexpectedKeyword(key.clone()));
        }

        Ok(())
    }
}

/// Whether `c` can appear in an identifier.
pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `s` is an ASCII identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(is_identifier_char)
}

/// Split a leading `name =` from an argument.
///
/// Returns the keyword (if any) and the text where the value starts.
fn split_keyword(s: &str) -> (Option<&str>, &str) {
    let end = s.find(|c: char| !is_identifier_char(c)).unwrap_or(s.len());
    let (ident, rest) = s.split_at(end);

    if !is_identifier(ident) {
        return (None, s);
    }

    match rest.trim_start().strip_prefix('=') {
        Some(after_eq) => (Some(ident), after_eq.trim_start()),
        None => (None, s),
    }
}

/// Parse one value, returning it and the unconsumed rest.
fn parse_value(s: &str) -> Result<(String, &str), MacroError> {
    let mut chars = s.char_indices();

    match chars.next() {
        Some((_, quote @ ('"' | '\''))) => {
            let mut value = String::new();
            let mut escaped = false;

            for (i, c) in chars {
                if escaped {
                    value.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    return Ok((value, &s[i + c.len_utf8()..]));
                } else {
                    value.push(c);
                }
            }

            Err(MacroError::Syntax("unterminated string literal".to_owned()))
        }
        Some(_) => {
            let end = s.find(',').unwrap_or(s.len());
            let value = s[..end].trim_end();

            if value.is_empty() {
                return Err(MacroError::Syntax("expected argument before `,`".to_owned()));
            }
            if value.contains(char::is_whitespace) {
                return Err(MacroError::Syntax(format!(
                    "unquoted argument `{value}` contains whitespace"
                )));
            }

            Ok((value.to_owned(), &s[end..]))
        }
        None => Err(MacroError::Syntax("expected argument".to_owned())),
    }
}
