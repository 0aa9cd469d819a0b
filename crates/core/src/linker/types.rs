//! Types for the linker module.

use serde::{Deserialize, Serialize};

/// What a link call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// A correct link was already in place; nothing was written.
    Unchanged,
    /// A new link was created.
    Created,
    /// An existing entry at the target was replaced.
    Replaced,
}

impl LinkOutcome {
    /// Whether the filesystem was modified.
    pub fn wrote(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of sweeping a library root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub broken_links_removed: usize,
    pub directories_pruned: usize,
    /// Non-fatal errors encountered.
    pub errors: Vec<String>,
}

impl SweepReport {
    pub fn merge(&mut self, other: SweepReport) {
        self.broken_links_removed += other.broken_links_removed;
        self.directories_pruned += other.directories_pruned;
        self.errors.extend(other.errors);
    }
}
