//! File system linker implementation.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::error::LinkError;
use super::remap::MountRemap;
use super::traits::Linker;
use super::types::{LinkOutcome, SweepReport};

/// Symlink-based linker on the local file system.
pub struct FsLinker {
    remap: MountRemap,
}

impl FsLinker {
    /// Creates a linker that writes link targets through `remap`.
    pub fn new(remap: MountRemap) -> Self {
        Self { remap }
    }

    /// Creates a linker where both views share one mount.
    pub fn with_defaults() -> Self {
        Self::new(MountRemap::identity())
    }

    #[cfg(unix)]
    async fn create_symlink(points_to: &Path, link: &Path) -> std::io::Result<()> {
        fs::symlink(points_to, link).await
    }

    #[cfg(windows)]
    async fn create_symlink(points_to: &Path, link: &Path) -> std::io::Result<()> {
        fs::symlink_file(points_to, link).await
    }

    /// Whether the symlink at `link` points at something that no longer
    /// exists, checked through the source view.
    async fn is_broken(&self, link: &Path) -> Result<bool, std::io::Error> {
        let stored = fs::read_link(link).await?;
        let resolved = if stored.is_relative() {
            link.parent().map(|p| p.join(&stored)).unwrap_or(stored)
        } else {
            stored
        };

        let check = self.remap.to_source(&resolved);
        Ok(!fs::try_exists(&check).await?)
    }

    /// Collect symlinks and directories under `root`, excluding `root`.
    async fn walk(root: &Path, report: &mut SweepReport) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let mut links = Vec::new();
        let mut dirs = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    report
                        .errors
                        .push(format!("Failed to read directory {}: {}", dir.display(), e));
                    continue;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        report
                            .errors
                            .push(format!("Failed to read entry in {}: {}", dir.display(), e));
                        break;
                    }
                };

                let path = entry.path();
                match entry.file_type().await {
                    Ok(ft) if ft.is_symlink() => links.push(path),
                    Ok(ft) if ft.is_dir() => {
                        dirs.push(path.clone());
                        pending.push(path);
                    }
                    Ok(_) => {}
                    Err(e) => report
                        .errors
                        .push(format!("Failed to stat {}: {}", path.display(), e)),
                }
            }
        }

        (links, dirs)
    }
}

#[async_trait]
impl Linker for FsLinker {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn link(&self, source: &Path, target: &Path) -> Result<LinkOutcome, LinkError> {
        let points_to = self.remap.to_consumer(source);

        let existed = match fs::symlink_metadata(target).await {
            Ok(meta) => {
                if meta.file_type().is_symlink() {
                    if let Ok(current) = fs::read_link(target).await {
                        if current == points_to {
                            return Ok(LinkOutcome::Unchanged);
                        }
                    }
                } else if meta.is_dir() {
                    return Err(LinkError::TargetIsDirectory {
                        path: target.to_path_buf(),
                    });
                }

                fs::remove_file(target)
                    .await
                    .map_err(|e| LinkError::RemoveFailed {
                        path: target.to_path_buf(),
                        source: e,
                    })?;
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                return Err(LinkError::InspectFailed {
                    path: target.to_path_buf(),
                    source: e,
                })
            }
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LinkError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        Self::create_symlink(&points_to, target)
            .await
            .map_err(|e| LinkError::SymlinkFailed {
                link: target.to_path_buf(),
                points_to: points_to.clone(),
                error: e,
            })?;

        info!("✓ {} → {}", target.display(), points_to.display());

        Ok(if existed {
            LinkOutcome::Replaced
        } else {
            LinkOutcome::Created
        })
    }

    async fn sweep(&self, root: &Path) -> SweepReport {
        let mut report = SweepReport::default();

        match fs::try_exists(root).await {
            Ok(true) => {}
            Ok(false) => return report,
            Err(e) => {
                report
                    .errors
                    .push(format!("Failed to check {}: {}", root.display(), e));
                return report;
            }
        }

        let (links, mut dirs) = Self::walk(root, &mut report).await;

        for link in links {
            match self.is_broken(&link).await {
                Ok(true) => match fs::remove_file(&link).await {
                    Ok(()) => {
                        debug!("Removed broken symlink {}", link.display());
                        report.broken_links_removed += 1;
                    }
                    Err(e) => report
                        .errors
                        .push(format!("Failed to remove {}: {}", link.display(), e)),
                },
                Ok(false) => {}
                // Uncertain links are left alone
                Err(e) => report
                    .errors
                    .push(format!("Failed to check link {}: {}", link.display(), e)),
            }
        }

        // Deepest first so parents see their children already pruned
        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in dirs {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    report
                        .errors
                        .push(format!("Failed to read directory {}: {}", dir.display(), e));
                    continue;
                }
            };

            match entries.next_entry().await {
                Ok(None) => match fs::remove_dir(&dir).await {
                    Ok(()) => report.directories_pruned += 1,
                    Err(e) => report.errors.push(format!(
                        "Failed to remove directory {}: {}",
                        dir.display(),
                        e
                    )),
                },
                Ok(Some(_)) => {}
                Err(e) => report.errors.push(format!(
                    "Failed to check directory {}: {}",
                    dir.display(),
                    e
                )),
            }
        }

        if report.broken_links_removed > 0 || report.directories_pruned > 0 {
            info!(
                "Swept {}: {} broken links, {} empty directories",
                root.display(),
                report.broken_links_removed,
                report.directories_pruned
            );
        }
        for error in &report.errors {
            warn!("Sweep of {}: {}", root.display(), error);
        }

        report
    }
}
