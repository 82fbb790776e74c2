//! Macro environment: a typed variable store and a registry of named macros.
//!
//! One [`Environment`] lives for exactly one build. Plugins receive it once at
//! build start, seed their state into [`Variables`] and register callables
//! with [`Environment::register_macro`].

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::MacroArgs;

/// Signature of a registered macro.
///
/// Macros get mutable access to the build's variables and the arguments of
/// the call, and return the text spliced into the Markdown source.
pub type MacroFn = dyn FnMut(&mut Variables, &MacroArgs) -> Result<String, MacroError> + Send;

/// Error raised while evaluating a macro expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    /// No macro is registered under this name.
    #[error("unknown macro `{0}`")]
    UnknownMacro(String),
    /// A required argument was neither passed by position nor by keyword.
    #[error("missing argument `{name}` (position {position})")]
    MissingArgument {
        /// Parameter name.
        name: String,
        /// Zero-based parameter position.
        position: usize,
    },
    /// More positional arguments than the macro accepts.
    #[error("expected at most {expected} positional argument(s), got {found}")]
    TooManyArguments {
        /// Number of accepted parameters.
        expected: usize,
        /// Number of positional arguments passed.
        found: usize,
    },
    /// A keyword argument that matches no parameter.
    #[error("unexpected keyword argument `{0}`")]
    UnexpectedKeyword(String),
    /// The variable store has no entry under this name.
    #[error("variable `{0}` is not defined")]
    MissingVariable(String),
    /// The variable exists but holds a value of another type.
    #[error("variable `{0}` has an unexpected type")]
    VariableType(String),
    /// Malformed expression.
    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Named, typed variables shared by the macros of one build.
#[derive(Default)]
pub struct Variables {
    values: HashMap<String, Box<dyn Any + Send>>,
}

impl Variables {
    /// Insert or replace a variable.
    pub fn insert<T: Any + Send>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    /// Whether a variable exists under `name`, regardless of its type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a variable, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    /// Borrow a variable as `T`.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::MissingVariable` if nothing is stored under `name`
    /// and `MacroError::VariableType` if the stored value is not a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, MacroError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| MacroError::MissingVariable(name.to_owned()))?;
        (**value)
            .downcast_ref::<T>()
            .ok_or_else(|| MacroError::VariableType(name.to_owned()))
    }

    /// Mutably borrow a variable as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Any>(&mut self, name: &str) -> Result<&mut T, MacroError> {
        let value = self
            .values
            .get_mut(name)
            .ok_or_else(|| MacroError::MissingVariable(name.to_owned()))?;
        (**value)
            .downcast_mut::<T>()
            .ok_or_else(|| MacroError::VariableType(name.to_owned()))
    }
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Variables").field("names", &names).finish()
    }
}

/// Build-scoped macro environment.
///
/// # Example
///
/// ```
/// use uec_renderer::{Environment, MacroArgs};
///
/// let mut env = Environment::new();
/// env.variables_mut().insert("greeting", "Hello".to_owned());
/// env.register_macro("greet", |vars, args| {
///     let greeting = vars.get::<String>("greeting")?;
///     Ok(format!("{greeting}, {}!", args.require(0, "name")?))
/// });
///
/// let args = MacroArgs::parse(r#""world""#).unwrap();
/// assert_eq!(env.call("greet", &args).unwrap(), "Hello, world!");
/// ```
#[derive(Default)]
pub struct Environment {
    variables: Variables,
    macros: BTreeMap<String, Box<MacroFn>>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro, replacing any macro with the same name.
    pub fn register_macro<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: FnMut(&mut Variables, &MacroArgs) -> Result<String, MacroError> + Send + 'static,
    {
        let name = name.into();
        tracing::trace!(name = %name, "Registered macro");
        self.macros.insert(name, Box::new(handler));
    }

    /// Whether a macro is registered under `name`.
    #[must_use]
    pub fn has_macro(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Registered macro names in sorted order.
    pub fn macro_names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }

    /// Variable store.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Mutable variable store.
    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Invoke a macro by name.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::UnknownMacro` if no macro has this name, or the
    /// macro's own error.
    pub fn call(&mut self, name: &str, args: &MacroArgs) -> Result<String, MacroError> {
        let handler = self
            .macros
            .get_mut(name)
            .ok_or_else(|| MacroError::UnknownMacro(name.to_owned()))?;
        handler(&mut self.variables, args)
    }

    /// Render a string variable for a bare `{{ name }}` expression.
    ///
    /// # Errors
    ///
    /// Returns `MacroError::MissingVariable` or `MacroError::VariableType`.
    pub fn render_variable(&self, name: &str) -> Result<String, MacroError> {
        self.variables.get::<String>(name).cloned()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("variables", &self.variables)
            .field("macros", &self.macros.keys().collect::<Vec<_>>())
            .finish()
    }
}
