//! Types for the organiser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::linker::SweepReport;
use crate::reconcile::ReconcileStats;
use crate::state::StateError;

/// Errors that abort a scan cycle.
///
/// Per-file problems never surface here; they are logged and counted in the
/// report instead.
#[derive(Debug, Error)]
pub enum OrganiserError {
    /// Persisting the new state failed.
    #[error("state store error: {0}")]
    State(#[from] StateError),

    /// The cycle task panicked or was cancelled.
    #[error("scan cycle aborted: {0}")]
    Aborted(String),
}

/// What one category did during a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Video files found under the category root.
    pub discovered: usize,
    /// Files left out because they could not be classified.
    pub rejected: usize,
    /// Targets that had more than one candidate.
    pub duplicate_groups: usize,
    /// Candidates that lost to a better copy.
    pub losers: usize,
    pub links: ReconcileStats,
    /// Entries in state for this category after the cycle.
    pub tracked: usize,
}

/// Summary of a completed scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub cycle_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Whether the source mount was readable. When it is not, the cycle
    /// leaves the library and state untouched.
    pub mount_available: bool,
    pub sweep: SweepReport,
    /// State entries dropped because their source vanished.
    pub evicted: usize,
    pub films: CategoryReport,
    pub shows: CategoryReport,
}

impl ScanReport {
    /// Total filesystem writes across both categories.
    pub fn writes(&self) -> usize {
        self.films.links.writes() + self.shows.links.writes()
    }
}

/// Current organiser status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganiserStatus {
    /// Whether the scan loop is running.
    pub running: bool,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<ScanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
