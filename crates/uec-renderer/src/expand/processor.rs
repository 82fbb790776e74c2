//! Macro expander for Markdown sources.
//!
//! Replaces expressions with the output of the macros they call, line by
//! line, before the Markdown is rendered.

use uec_config::{MacrosConfig, OnUndefined};

use super::fence::{FenceTracker, LineKind};
use super::parser::{Expression, find_expression, parse_expression};
use crate::{Environment, MacroError};

/// Macro failure that aborted expansion.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct ExpandError {
    /// Line of the failing expression (1-indexed).
    pub line: usize,
    /// Underlying macro error.
    pub source: MacroError,
}

/// Expands macro expressions in Markdown against an [`Environment`].
///
/// Macros run in the order their expressions appear. An expression that
/// fails is left in the output unchanged and recorded as a warning, unless
/// `on_error_fail` is set.
///
/// # Example
///
/// ```
/// use uec_config::MacrosConfig;
/// use uec_renderer::{Environment, MacroExpander};
///
/// let mut env = Environment::new();
/// env.register_macro("shout", |_, args| Ok(args.require(0, "text")?.to_uppercase()));
///
/// let config = MacrosConfig::default();
/// let mut expander = MacroExpander::new(&mut env, &config);
/// let output = expander.process("Say {{ shout('hi') }}!\n").unwrap();
/// assert_eq!(output, "Say HI!\n");
/// ```
pub struct MacroExpander<'a> {
    env: &'a mut Environment,
    config: &'a MacrosConfig,
    fence: FenceTracker,
    warnings: Vec<String>,
    line_offset: usize,
}

impl<'a> MacroExpander<'a> {
    /// Create an expander for one page.
    #[must_use]
    pub fn new(env: &'a mut Environment, config: &'a MacrosConfig) -> Self {
        Self {
            env,
            config,
            fence: FenceTracker::new(),
            warnings: Vec::new(),
            line_offset: 0,
        }
    }

    /// Report line numbers shifted by `offset`.
    ///
    /// Used when `input` starts partway through a file, e.g. after front
    /// matter, so warnings point at lines of the original source.
    #[must_use]
    pub fn with_line_offset(mut self, offset: usize) -> Self {
        self.line_offset = offset;
        self
    }

    /// Expand all expressions in `input`.
    ///
    /// Line endings (`\n` or `\r\n`) are kept as they appear in `input`.
    ///
    /// # Errors
    ///
    /// Returns the first macro error when `on_error_fail` is set.
    pub fn process(&mut self, input: &str) -> Result<String, ExpandError> {
        let mut output = String::with_capacity(input.len());

        for (idx, raw) in input.split_inclusive('\n').enumerate() {
            let (line, ending) = split_line_ending(raw);
            let processed = self.process_line(line, idx + 1 + self.line_offset)?;
            output.push_str(&processed);
            output.push_str(ending);
        }

        Ok(output)
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the expander, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<String, ExpandError> {
        let kind = self.fence.classify(line);
        if kind != LineKind::Text && !self.config.render_in_code_blocks {
            return Ok(line.to_owned());
        }

        let mut result = String::with_capacity(line.len());
        let mut remaining = line;

        while let Some(found) = find_expression(
            remaining,
            &self.config.variable_start,
            &self.config.variable_end,
        ) {
            result.push_str(&remaining[..found.start]);
            let source = &remaining[found.start..found.end];

            match self.evaluate(found.body, line_num) {
                Ok(Some(output)) => result.push_str(&output),
                Ok(None) => result.push_str(source),
                Err(error) if self.config.on_error_fail => {
                    return Err(ExpandError {
                        line: line_num,
                        source: error,
                    });
                }
                Err(error) => {
                    tracing::warn!(line = line_num, error = %error, "Macro expansion failed");
                    self.warnings.push(format!("line {line_num}: {error}"));
                    result.push_str(source);
                }
            }

            remaining = &remaining[found.end..];
        }

        result.push_str(remaining);
        Ok(result)
    }

    /// Evaluate one expression body.
    ///
    /// `Ok(None)` means the expression names something undefined and is kept
    /// as written.
    fn evaluate(&mut self, body: &str, line_num: usize) -> Result<Option<String>, MacroError> {
        match parse_expression(body)? {
            Expression::Call { name, args } => {
                if !self.env.has_macro(&name) && self.config.on_undefined == OnUndefined::Keep {
                    self.warnings
                        .push(format!("line {line_num}: unknown macro `{name}`"));
                    return Ok(None);
                }
                self.env.call(&name, &args).map(Some)
            }
            Expression::Variable(name) => {
                if !self.env.variables().contains(&name)
                    && self.config.on_undefined == OnUndefined::Keep
                {
                    self.warnings
                        .push(format!("line {line_num}: undefined variable `{name}`"));
                    return Ok(None);
                }
                self.env.render_variable(&name).map(Some)
            }
        }
    }
}

/// Split a line into its content and its terminator.
fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}
