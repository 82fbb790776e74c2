//! Build-scoped counters and the table label map.

use std::collections::HashMap;

/// Counters and table labels of one build.
///
/// Both counters start at zero and never decrease; they saturate at
/// `u64::MAX`. Table numbers follow the order in which captions are rendered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildState {
    requirement_counter: u64,
    table_counter: u64,
    table_refs: HashMap<String, u64>,
}

impl BuildState {
    /// Variable name the state is stored under in the environment.
    pub const VARIABLE: &'static str = "uec";

    /// Sentinel shown for a label without a recorded table number.
    pub const UNRESOLVED: &'static str = "??";

    /// Create state with both counters at zero and no labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the requirement counter and format the new ID.
    ///
    /// ```
    /// use uec_macros::BuildState;
    ///
    /// let mut state = BuildState::new();
    /// assert_eq!(state.next_requirement(), "**[UEC-001]**");
    /// assert_eq!(state.next_requirement(), "**[UEC-002]**");
    /// ```
    pub fn next_requirement(&mut self) -> String {
        self.requirement_counter = self.requirement_counter.saturating_add(1);
        format!("**[UEC-{:03}]**", self.requirement_counter)
    }

    /// Assign the next table number to `label` and format the caption.
    ///
    /// A label captioned twice keeps the newer number.
    pub fn caption_table(&mut self, label: &str, text: &str) -> String {
        self.table_counter = self.table_counter.saturating_add(1);
        self.table_refs.insert(label.to_owned(), self.table_counter);
        tracing::debug!(label, number = self.table_counter, "Recorded table caption");
        format!("Table: {text}")
    }

    /// Format a reference to the table captioned as `label`.
    #[must_use]
    pub fn table_ref(&self, label: &str) -> String {
        match self.table_number(label) {
            Some(number) => format!("Table {number}"),
            None => format!("Table {}", Self::UNRESOLVED),
        }
    }

    /// Number recorded for `label`, if it has been captioned.
    #[must_use]
    pub fn table_number(&self, label: &str) -> Option<u64> {
        self.table_refs.get(label).copied()
    }

    /// Number of requirement IDs issued so far.
    #[must_use]
    pub fn requirement_counter(&self) -> u64 {
        self.requirement_counter
    }

    /// Number of table captions rendered so far.
    #[must_use]
    pub fn table_counter(&self) -> u64 {
        self.table_counter
    }
}
