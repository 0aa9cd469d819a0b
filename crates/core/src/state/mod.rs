//! Persisted mapping of linked source files to their library targets.
//!
//! The state is what lets a scan be idempotent: a source whose recorded
//! target is unchanged is carried forward without touching the filesystem.

mod store;
mod types;

pub use store::{JsonStateStore, StateStore};
pub use types::{LibraryState, PersistedEntry};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Could not serialize the state.
    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Could not write the temporary state file.
    #[error("Failed to write state to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not move the temporary file into place.
    #[error("Failed to replace state file {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
