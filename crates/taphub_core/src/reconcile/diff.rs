//! Set difference between persisted and current rosters.

use std::collections::BTreeSet;

/// Minimal transition for one location. Both sides are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl RosterDiff {
    /// Returns `true` when the location did not change.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Number of names that changed status.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

/// Computes `added = current - previous` and `removed = previous - current`.
pub fn reconcile(previous: &BTreeSet<String>, current: &BTreeSet<String>) -> RosterDiff {
    RosterDiff {
        added: current.difference(previous).cloned().collect(),
        removed: previous.difference(current).cloned().collect(),
    }
}
