//! Translation between the source mount and consumer mount views.

use std::path::{Path, PathBuf};

/// Maps paths between where this process sees the media (source mount) and
/// where the media server sees it (consumer mount).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRemap {
    source_mount: PathBuf,
    consumer_mount: PathBuf,
}

impl MountRemap {
    pub fn new(source_mount: impl Into<PathBuf>, consumer_mount: impl Into<PathBuf>) -> Self {
        Self {
            source_mount: source_mount.into(),
            consumer_mount: consumer_mount.into(),
        }
    }

    /// A remap that leaves every path unchanged.
    pub fn identity() -> Self {
        Self::new("/", "/")
    }

    pub fn source_mount(&self) -> &Path {
        &self.source_mount
    }

    pub fn consumer_mount(&self) -> &Path {
        &self.consumer_mount
    }

    pub fn is_identity(&self) -> bool {
        self.source_mount == self.consumer_mount
    }

    /// Rewrite a source-view path into the consumer view. Paths outside the
    /// source mount are returned unchanged.
    pub fn to_consumer(&self, path: &Path) -> PathBuf {
        rebase(path, &self.source_mount, &self.consumer_mount)
    }

    /// Rewrite a consumer-view path into the source view. Paths outside the
    /// consumer mount are returned unchanged.
    pub fn to_source(&self, path: &Path) -> PathBuf {
        rebase(path, &self.consumer_mount, &self.source_mount)
    }
}

fn rebase(path: &Path, from: &Path, to: &Path) -> PathBuf {
    if from == to {
        return path.to_path_buf();
    }
    match path.strip_prefix(from) {
        Ok(relative) => to.join(relative),
        Err(_) => path.to_path_buf(),
    }
}
