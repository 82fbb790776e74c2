//! YAML front matter of Markdown pages.

use serde::Deserialize;

/// Page settings read from front matter.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title.
    pub title: Option<String>,
    /// Per-page override of `render_by_default`.
    pub render_macros: Option<bool>,
}

/// Split a leading `---` ... `---` block from the page body.
///
/// Returns `(None, source)` when the page has no complete front matter block.
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, source)
}

/// Parse front matter YAML.
///
/// Empty content yields the defaults.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or a known field has the wrong type.
pub fn parse_front_matter(yaml: &str) -> Result<FrontMatter, serde_yaml::Error> {
    let trimmed = yaml.trim();
    if trimmed.is_empty() {
        return Ok(FrontMatter::default());
    }
    serde_yaml::from_str(trimmed)
}
