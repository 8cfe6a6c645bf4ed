//! Outcomes of the toggle actions (library membership, likes).

use serde::Serialize;

/// Result of flipping a user↔book marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// What was toggled; selects the status message reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleTarget {
    Library,
    Like,
}

impl ToggleOutcome {
    pub fn status_message(self, target: ToggleTarget) -> &'static str {
        match (target, self) {
            (ToggleTarget::Library, Self::Added) => "Book was added",
            (ToggleTarget::Library, Self::Removed) => "Book was removed",
            (ToggleTarget::Like, Self::Added) => "Like was added",
            (ToggleTarget::Like, Self::Removed) => "Like was removed",
        }
    }
}
