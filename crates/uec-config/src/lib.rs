//! Configuration for the UEC documentation macros host.
//!
//! Parses TOML configuration with serde. The file itself is owned by the
//! caller; this crate only deals with already-loaded text.
//!
//! ```toml
//! [macros]
//! on_error_fail = false
//! on_undefined = "keep"
//! render_by_default = true
//! render_in_code_blocks = false
//! variable_start = "{{"
//! variable_end = "}}"
//!
//! [extra]
//! project = "Widget"
//! ```

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Macro expansion settings.
    pub macros: MacrosConfig,
    /// Free-form values exposed to pages as variables.
    pub extra: toml::Table,
}

/// Behavior when a page calls a macro that is not registered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnUndefined {
    /// Leave the expression in the output unchanged.
    #[default]
    Keep,
    /// Treat the call as a macro error.
    Strict,
}

/// Macro expansion settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MacrosConfig {
    /// Abort the build on the first macro error instead of recording a warning.
    pub on_error_fail: bool,
    /// Behavior for unknown macro names.
    pub on_undefined: OnUndefined,
    /// Whether pages are expanded unless their front matter opts out.
    pub render_by_default: bool,
    /// Whether expressions inside fenced code blocks are expanded.
    pub render_in_code_blocks: bool,
    /// Opening delimiter of a macro expression.
    pub variable_start: String,
    /// Closing delimiter of a macro expression.
    pub variable_end: String,
}

impl Default for MacrosConfig {
    fn default() -> Self {
        Self {
            on_error_fail: false,
            on_undefined: OnUndefined::Keep,
            render_by_default: true,
            render_in_code_blocks: false,
            variable_start: "{{".to_owned(),
            variable_end: "}}".to_owned(),
        }
    }
}

impl MacrosConfig {
    /// Validate delimiter settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a delimiter is empty or both are equal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.variable_start, "macros.variable_start")?;
        require_non_empty(&self.variable_end, "macros.variable_end")?;
        if self.variable_start == self.variable_end {
            return Err(ConfigError::Validation(
                "macros.variable_start and macros.variable_end must differ".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.macros.validate()
    }

    /// Scalar `[extra]` values rendered as strings.
    ///
    /// Tables, arrays and datetimes are skipped.
    pub fn extra_variables(&self) -> impl Iterator<Item = (&str, String)> {
        self.extra.iter().filter_map(|(key, value)| {
            let rendered = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((key.as_str(), rendered))
        })
    }
}
