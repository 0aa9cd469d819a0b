//! Error types for the linker module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a link.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Failed to create the target's parent directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory occupies the target path.
    #[error("Target path is a directory: {path}")]
    TargetIsDirectory { path: PathBuf },

    /// Failed to inspect what currently sits at the target path.
    #[error("Failed to inspect target {path}")]
    InspectFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the existing entry at the target path.
    #[error("Failed to remove existing entry at {path}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the symlink itself.
    #[error("Failed to link {link} -> {points_to}")]
    SymlinkFailed {
        link: PathBuf,
        points_to: PathBuf,
        #[source]
        error: std::io::Error,
    },
}
