//! Build pipeline.
//!
//! A [`Build`] renders a set of pages in one pass. Every call to
//! [`Build::run`] starts from a fresh [`Environment`], so nothing a macro
//! records survives into the next build.

use pulldown_cmark::{Options, Parser};
use uec_config::Config;

use crate::front_matter::{FrontMatter, parse_front_matter, split_front_matter};
use crate::{Environment, ExpandError, MacroExpander};

/// Plugin entry point, called once per build before any page is expanded.
pub type Plugin = fn(&mut Environment);

/// Markdown source of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Page path, used for diagnostics only.
    pub path: String,
    /// Markdown source, optionally with front matter.
    pub source: String,
}

impl Page {
    /// Create a page.
    #[must_use]
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Result of rendering one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Page path.
    pub path: String,
    /// Title from front matter.
    pub title: Option<String>,
    /// Markdown after macro expansion, without front matter.
    pub markdown: String,
    /// Rendered HTML.
    pub html: String,
    /// Warnings collected while rendering this page.
    pub warnings: Vec<String>,
}

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A macro failed with `on_error_fail` enabled.
    #[error("{path}: {source}")]
    Expand {
        /// Page path.
        path: String,
        /// Expansion failure.
        source: ExpandError,
    },
}

/// Documentation build over in-memory pages.
///
/// # Example
///
/// ```
/// use uec_config::Config;
/// use uec_renderer::{Build, Environment, Page};
///
/// fn define_env(env: &mut Environment) {
///     env.register_macro("version", |_, _| Ok("1.2".to_owned()));
/// }
///
/// let build = Build::new(Config::default()).with_plugin(define_env);
/// let pages = build.run(&[Page::new("index.md", "Version {{ version() }}")]).unwrap();
/// assert_eq!(pages[0].markdown, "Version 1.2");
/// assert_eq!(pages[0].html, "<p>Version 1.2</p>\n");
/// ```
pub struct Build {
    config: Config,
    plugins: Vec<Plugin>,
}

impl Build {
    /// Create a build with no plugins.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            plugins: Vec::new(),
        }
    }

    /// Add a plugin. Plugins run in the order they were added.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Build configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the environment for a new build.
    ///
    /// `[extra]` values are published as string variables first, then every
    /// plugin is called.
    #[must_use]
    pub fn environment(&self) -> Environment {
        let mut env = Environment::new();

        for (name, value) in self.config.extra_variables() {
            env.variables_mut().insert(name, value);
        }
        for plugin in &self.plugins {
            plugin(&mut env);
        }

        env
    }

    /// Render `pages` in order.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Expand` for the first failing macro when
    /// `on_error_fail` is set.
    pub fn run(&self, pages: &[Page]) -> Result<Vec<RenderedPage>, BuildError> {
        tracing::info!(pages = pages.len(), "Starting build");

        let mut env = self.environment();
        let mut rendered = Vec::with_capacity(pages.len());

        for page in pages {
            rendered.push(self.render_page(&mut env, page)?);
        }

        let warning_count: usize = rendered.iter().map(|p| p.warnings.len()).sum();
        tracing::info!(
            pages = rendered.len(),
            warnings = warning_count,
            "Build completed"
        );

        Ok(rendered)
    }

    fn render_page(&self, env: &mut Environment, page: &Page) -> Result<RenderedPage, BuildError> {
        let mut warnings = Vec::new();
        let (yaml, body) = split_front_matter(&page.source);

        let front_matter = match yaml.map(parse_front_matter).transpose() {
            Ok(front_matter) => front_matter.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %page.path, error = %e, "Failed to parse front matter");
                warnings.push(format!("invalid front matter: {e}"));
                FrontMatter::default()
            }
        };

        let render_macros = front_matter
            .render_macros
            .unwrap_or(self.config.macros.render_by_default);
        tracing::debug!(path = %page.path, render_macros, "Rendering page");

        let markdown = if render_macros {
            // The body is a suffix of the source; count the lines before it.
            let skipped = page.source[..page.source.len() - body.len()].matches('\n').count();
            let mut expander =
                MacroExpander::new(env, &self.config.macros).with_line_offset(skipped);
            let expanded = expander.process(body).map_err(|source| BuildError::Expand {
                path: page.path.clone(),
                source,
            })?;
            warnings.extend(expander.into_warnings());
            expanded
        } else {
            body.to_owned()
        };

        let html = render_html(&markdown);

        Ok(RenderedPage {
            path: page.path.clone(),
            title: front_matter.title,
            markdown,
            html,
            warnings,
        })
    }
}

/// Render Markdown to HTML with table support.
fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}
