//! Code fence tracking for macro expansion.
//!
//! Lets the expander leave `{{ ... }}` inside fenced code blocks untouched, so
//! pages can document macro syntax literally.

/// Role of a line relative to fenced code blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Ordinary Markdown outside any fence.
    Text,
    /// Opening fence marker (with optional info string).
    Opening,
    /// Line inside a fenced block.
    Body,
    /// Closing fence marker.
    Closing,
}

/// An open fence: marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

/// Line-by-line fence state.
///
/// Fences use three or more backticks or tildes, indented by at most three
/// spaces. A fence closes on a line holding only the same marker, repeated at
/// least as many times.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Classify `line` and advance the fence state past it.
    pub(crate) fn classify(&mut self, line: &str) -> LineKind {
        let trimmed = marker_candidate(line);

        match self.open {
            Some(fence) => {
                if trimmed.is_some_and(|t| closes(t, fence)) {
                    self.open = None;
                    LineKind::Closing
                } else {
                    LineKind::Body
                }
            }
            None => match trimmed.and_then(opening) {
                Some(fence) => {
                    self.open = Some(fence);
                    LineKind::Opening
                }
                None => LineKind::Text,
            },
        }
    }
}

/// `line` without its indentation, or `None` if it is indented too far to
/// hold a fence marker.
fn marker_candidate(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(' ');
    (line.len() - trimmed.len() <= 3).then_some(trimmed)
}

/// Marker run at the start of `trimmed`, if it is long enough to be a fence.
fn opening(trimmed: &str) -> Option<Fence> {
    let marker = trimmed.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}

fn closes(trimmed: &str, fence: Fence) -> bool {
    let len = trimmed.chars().take_while(|&c| c == fence.marker).count();
    len >= fence.len && trimmed[len * fence.marker.len_utf8()..].trim().is_empty()
}
