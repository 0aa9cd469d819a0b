//! Linker wrapper that records calls for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::linker::{FsLinker, LinkError, LinkOutcome, Linker, SweepReport};

/// A recorded link call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLink {
    pub source: PathBuf,
    pub target: PathBuf,
    /// `None` when the link failed.
    pub outcome: Option<LinkOutcome>,
}

/// Delegates to a real [`FsLinker`] and records every call.
///
/// Lets tests assert on exactly which links a cycle wrote, including that a
/// repeated cycle wrote nothing.
pub struct RecordingLinker {
    inner: FsLinker,
    links: Arc<RwLock<Vec<RecordedLink>>>,
    sweeps: Arc<RwLock<Vec<(PathBuf, SweepReport)>>>,
}

impl RecordingLinker {
    pub fn new(inner: FsLinker) -> Self {
        Self {
            inner,
            links: Arc::new(RwLock::new(Vec::new())),
            sweeps: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// All link calls so far.
    pub async fn recorded_links(&self) -> Vec<RecordedLink> {
        self.links.read().await.clone()
    }

    /// All sweeps so far with their reports.
    pub async fn recorded_sweeps(&self) -> Vec<(PathBuf, SweepReport)> {
        self.sweeps.read().await.clone()
    }

    /// Number of link calls that modified the filesystem.
    pub async fn write_count(&self) -> usize {
        self.links
            .read()
            .await
            .iter()
            .filter(|l| l.outcome.is_some_and(|o| o.wrote()))
            .count()
    }

    /// Forget everything recorded so far.
    pub async fn clear(&self) {
        self.links.write().await.clear();
        self.sweeps.write().await.clear();
    }
}

#[async_trait]
impl Linker for RecordingLinker {
    fn name(&self) -> &str {
        "recording"
    }

    async fn link(&self, source: &Path, target: &Path) -> Result<LinkOutcome, LinkError> {
        let result = self.inner.link(source, target).await;
        self.links.write().await.push(RecordedLink {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            outcome: result.as_ref().ok().copied(),
        });
        result
    }

    async fn sweep(&self, root: &Path) -> SweepReport {
        let report = self.inner.sweep(root).await;
        self.sweeps
            .write()
            .await
            .push((root.to_path_buf(), report.clone()));
        report
    }
}
