//! Bringing the library in line with the selected winners.
//!
//! A winner whose source is already recorded with the same target is carried
//! forward untouched. Anything else is linked and recorded. A winner whose
//! link fails is left out of the new mapping so the next cycle retries it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::linker::{LinkOutcome, Linker};
use crate::metrics;
use crate::parser::MediaKind;
use crate::selector::Selection;
use crate::state::{LibraryState, PersistedEntry};

/// Counts of what reconciling one category did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// Carried forward from state, or already linked correctly.
    pub unchanged: usize,
    pub created: usize,
    pub replaced: usize,
    pub failed: usize,
}

impl ReconcileStats {
    /// Number of filesystem writes performed.
    pub fn writes(&self) -> usize {
        self.created + self.replaced
    }
}

/// Drop state entries whose source file no longer exists.
///
/// Returns how many entries were removed across both categories.
pub fn evict_stale(state: &mut LibraryState) -> usize {
    let mut evicted = 0;

    for kind in [MediaKind::Film, MediaKind::Episode] {
        state.entries_mut(kind).retain(|source, entry| {
            let exists = Path::new(source).exists();
            if !exists {
                debug!("Evicting {} entry {} -> {}", kind, source, entry.target);
                evicted += 1;
            }
            exists
        });
    }

    if evicted > 0 {
        metrics::STALE_EVICTIONS.inc_by(evicted as u64);
    }
    evicted
}

/// Link every winner and build the category's new mapping.
///
/// The returned mapping replaces the category's previous one wholesale, so
/// sources that are no longer winners drop out of state.
pub async fn reconcile_category(
    kind: MediaKind,
    prior: &BTreeMap<String, PersistedEntry>,
    selections: &[Selection],
    linker: &dyn Linker,
) -> (BTreeMap<String, PersistedEntry>, ReconcileStats) {
    let mut entries = BTreeMap::new();
    let mut stats = ReconcileStats::default();
    let category = kind.category();

    for selection in selections {
        let winner = &selection.winner;
        let source_key = winner.source_key();

        if let Some(existing) = prior.get(&source_key) {
            if existing.target == winner.target_key() {
                entries.insert(source_key, existing.clone());
                stats.unchanged += 1;
                metrics::LINKS
                    .with_label_values(&[category, "unchanged"])
                    .inc();
                continue;
            }
        }

        match linker.link(&winner.source.path, &winner.target).await {
            Ok(outcome) => {
                let label = match outcome {
                    LinkOutcome::Unchanged => {
                        stats.unchanged += 1;
                        "unchanged"
                    }
                    LinkOutcome::Created => {
                        stats.created += 1;
                        "created"
                    }
                    LinkOutcome::Replaced => {
                        stats.replaced += 1;
                        "replaced"
                    }
                };
                metrics::LINKS.with_label_values(&[category, label]).inc();
                entries.insert(source_key, PersistedEntry::from(winner));
            }
            Err(e) => {
                warn!(
                    "Failed to link {} -> {}: {}",
                    winner.source.path.display(),
                    winner.target.display(),
                    e
                );
                stats.failed += 1;
                metrics::LINKS.with_label_values(&[category, "failed"]).inc();
            }
        }
    }

    (entries, stats)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::linker::{FsLinker, MountRemap};
    use crate::resolver::ResolvedMedia;
    use crate::scanner::SourceFile;
    use crate::selector::Candidate;
    use crate::testing::RecordingLinker;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn selection(source: PathBuf, target: PathBuf, score: u32) -> Selection {
        Selection {
            winner: Candidate {
                source: SourceFile {
                    file_name: source.file_name().unwrap().to_string_lossy().into_owned(),
                    path: source,
                    extension: ".mkv".to_string(),
                    raw_name: "Movie".to_string(),
                    nested: false,
                    size_bytes: 0,
                },
                media: ResolvedMedia {
                    kind: MediaKind::Film,
                    title: "Movie".to_string(),
                    year: Some(2020),
                    season: None,
                    episode: None,
                    score,
                    verified: false,
                },
                target,
            },
            losers: vec![],
        }
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"video").unwrap();
    }

    #[test]
    fn test_evict_stale_removes_missing_sources() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("present.mkv");
        touch(&present);

        let entry = PersistedEntry {
            target: "/media/x".to_string(),
            title: "X".to_string(),
            year: None,
            season: None,
            episode: None,
            score: 0,
        };
        let mut state = LibraryState::default();
        state
            .films
            .insert(present.to_string_lossy().into_owned(), entry.clone());
        state
            .shows
            .insert("/definitely/not/here.mkv".to_string(), entry);

        assert_eq!(evict_stale(&mut state), 1);
        assert_eq!(state.films.len(), 1);
        assert!(state.shows.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_links_new_winner() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/movie.mkv");
        touch(&source);
        let target = temp.path().join("lib/Movie (2020)/Movie (2020).mkv");

        let linker = RecordingLinker::new(FsLinker::new(MountRemap::identity()));
        let selections = vec![selection(source.clone(), target.clone(), 150)];
        let (entries, stats) =
            reconcile_category(MediaKind::Film, &BTreeMap::new(), &selections, &linker).await;

        assert_eq!(stats.created, 1);
        assert_eq!(stats.writes(), 1);
        let entry = &entries[&source.to_string_lossy().into_owned()];
        assert_eq!(entry.target, target.to_string_lossy());
        assert_eq!(entry.score, 150);
        assert_eq!(fs::read_link(&target).unwrap(), source);
    }

    #[tokio::test]
    async fn test_reconcile_carries_forward_unchanged_entry() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/movie.mkv");
        touch(&source);
        let target = temp.path().join("lib/Movie (2020)/Movie (2020).mkv");

        let selections = vec![selection(source.clone(), target.clone(), 150)];
        let mut prior = BTreeMap::new();
        let mut recorded = PersistedEntry::from(&selections[0].winner);
        recorded.title = "Recorded Earlier".to_string();
        prior.insert(source.to_string_lossy().into_owned(), recorded.clone());

        let linker = RecordingLinker::new(FsLinker::new(MountRemap::identity()));
        let (entries, stats) =
            reconcile_category(MediaKind::Film, &prior, &selections, &linker).await;

        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.writes(), 0);
        assert!(linker.recorded_links().await.is_empty());
        assert_eq!(entries.values().next(), Some(&recorded));
        // No filesystem work at all, so the link was never created
        assert!(target.symlink_metadata().is_err());
    }

    #[tokio::test]
    async fn test_reconcile_failed_link_is_not_recorded() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src/movie.mkv");
        touch(&source);
        let target = temp.path().join("lib/Movie/Movie.mkv");
        fs::create_dir_all(&target).unwrap();

        let linker = RecordingLinker::new(FsLinker::new(MountRemap::identity()));
        let selections = vec![selection(source, target, 10)];
        let (entries, stats) =
            reconcile_category(MediaKind::Film, &BTreeMap::new(), &selections, &linker).await;

        assert_eq!(stats.failed, 1);
        assert!(entries.is_empty());
    }
}
