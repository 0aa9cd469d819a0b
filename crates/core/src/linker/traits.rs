//! Trait definitions for the linker module.

use std::path::Path;

use async_trait::async_trait;

use super::error::LinkError;
use super::types::{LinkOutcome, SweepReport};

/// Creates and maintains library symlinks.
#[async_trait]
pub trait Linker: Send + Sync {
    /// Returns the name of this linker implementation.
    fn name(&self) -> &str;

    /// Ensure `target` is a symlink to `source`.
    ///
    /// `source` is given in the source mount view. Does nothing when the
    /// link is already correct. Creates missing parent directories.
    async fn link(&self, source: &Path, target: &Path) -> Result<LinkOutcome, LinkError>;

    /// Remove broken symlinks under `root`, then prune directories left
    /// empty. `root` itself is never removed. Errors are collected in the
    /// report rather than aborting the sweep.
    async fn sweep(&self, root: &Path) -> SweepReport;
}
