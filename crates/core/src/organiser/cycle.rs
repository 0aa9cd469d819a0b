//! A single scan cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::LibraryConfig;
use crate::linker::{Linker, SweepReport};
use crate::metrics;
use crate::naming::TargetLayout;
use crate::parser::MediaKind;
use crate::reconcile::{evict_stale, reconcile_category};
use crate::resolver::{Classification, NameResolver, ResolvedMedia};
use crate::scanner::{self, SourceFile};
use crate::selector::{select_winners, Candidate};
use crate::state::{LibraryState, StateStore};

use super::types::{CategoryReport, OrganiserError, ScanReport};

/// Whether `path` is a readable, non-empty directory.
///
/// An empty mount point usually means the remote filesystem is not mounted.
pub fn mount_available(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Per-cycle context: identity, timing, the working state and what each
/// step did.
#[derive(Debug)]
pub struct ScanCycle {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    started: Instant,
    pub state: LibraryState,
    pub mount_available: bool,
    pub sweep: SweepReport,
    pub evicted: usize,
    pub films: CategoryReport,
    pub shows: CategoryReport,
}

impl ScanCycle {
    pub fn begin(state: LibraryState) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            started: Instant::now(),
            state,
            mount_available: false,
            sweep: SweepReport::default(),
            evicted: 0,
            films: CategoryReport::default(),
            shows: CategoryReport::default(),
        }
    }

    pub fn report_mut(&mut self, kind: MediaKind) -> &mut CategoryReport {
        match kind {
            MediaKind::Film => &mut self.films,
            MediaKind::Episode => &mut self.shows,
        }
    }

    /// Close the cycle, returning the final state and its report.
    pub fn finish(mut self) -> (LibraryState, ScanReport) {
        self.films.tracked = self.state.films.len();
        self.shows.tracked = self.state.shows.len();

        let report = ScanReport {
            cycle_id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            duration_ms: self.started.elapsed().as_millis() as u64,
            mount_available: self.mount_available,
            sweep: self.sweep,
            evicted: self.evicted,
            films: self.films,
            shows: self.shows,
        };
        (self.state, report)
    }
}

/// Runs scan cycles against one library.
pub struct CycleRunner {
    library: LibraryConfig,
    layout: TargetLayout,
    resolver: NameResolver,
    linker: Arc<dyn Linker>,
    state_store: Arc<dyn StateStore>,
}

impl CycleRunner {
    pub fn new(
        library: LibraryConfig,
        resolver: NameResolver,
        linker: Arc<dyn Linker>,
        state_store: Arc<dyn StateStore>,
    ) -> Self {
        let layout = TargetLayout::new(
            library.output_dir(MediaKind::Film),
            library.output_dir(MediaKind::Episode),
        );
        Self {
            library,
            layout,
            resolver,
            linker,
            state_store,
        }
    }

    pub fn library(&self) -> &LibraryConfig {
        &self.library
    }

    /// Run one full cycle: sweep, evict, reconcile films then shows, save.
    pub async fn run(&self) -> Result<ScanReport, OrganiserError> {
        let mut cycle = ScanCycle::begin(self.state_store.load());
        info!(cycle_id = %cycle.id, "Scan started");

        cycle.mount_available = mount_available(&self.library.source_mount);
        if cycle.mount_available {
            for kind in [MediaKind::Film, MediaKind::Episode] {
                let report = self.linker.sweep(&self.library.output_dir(kind)).await;
                cycle.sweep.merge(report);
            }
            metrics::SWEEP_LINKS_REMOVED.inc_by(cycle.sweep.broken_links_removed as u64);
            metrics::SWEEP_DIRS_PRUNED.inc_by(cycle.sweep.directories_pruned as u64);

            cycle.evicted = evict_stale(&mut cycle.state);
            if cycle.evicted > 0 {
                info!("Evicted {} stale state entries", cycle.evicted);
            }

            for kind in [MediaKind::Film, MediaKind::Episode] {
                self.process_category(&mut cycle, kind).await;
            }
        } else {
            let reason = if self.library.source_mount.is_dir() {
                "is empty"
            } else {
                "is missing or unreadable"
            };
            warn!(
                cycle_id = %cycle.id,
                "Source mount {} {}, skipping sweep, eviction and linking this cycle",
                self.library.source_mount.display(),
                reason
            );
        }

        self.state_store.save(&cycle.state)?;

        let (state, report) = cycle.finish();
        metrics::TRACKED_ENTRIES
            .with_label_values(&[MediaKind::Film.category()])
            .set(state.films.len() as i64);
        metrics::TRACKED_ENTRIES
            .with_label_values(&[MediaKind::Episode.category()])
            .set(state.shows.len() as i64);

        info!(
            cycle_id = %report.cycle_id,
            duration_ms = report.duration_ms,
            films = report.films.tracked,
            shows = report.shows.tracked,
            writes = report.writes(),
            "Scan complete"
        );

        Ok(report)
    }

    async fn process_category(&self, cycle: &mut ScanCycle, kind: MediaKind) {
        let category = kind.category();
        let root = self.library.source_root(kind);
        let files = match self.discover(root.clone()).await {
            Some(files) => files,
            None => return,
        };

        cycle.report_mut(kind).discovered = files.len();
        if files.is_empty() {
            info!("No {} found under {}", category, root.display());
            return;
        }
        info!("Found {} {} files", files.len(), category);

        let mut candidates = Vec::with_capacity(files.len());
        for file in files {
            match self.resolver.classify(&file, kind).await {
                Classification::Resolved(media) => match self.target_for(&media, &file) {
                    Some(target) => candidates.push(Candidate {
                        source: file,
                        media,
                        target,
                    }),
                    None => self.reject(cycle, kind, &file, "no target path"),
                },
                Classification::Rejected(reason) => {
                    self.reject(cycle, kind, &file, &reason.to_string())
                }
            }
        }

        let selections = select_winners(candidates);
        {
            let report = cycle.report_mut(kind);
            for selection in &selections {
                if selection.is_duplicate() {
                    report.duplicate_groups += 1;
                    report.losers += selection.losers.len();
                }
            }
        }
        let losers: usize = selections.iter().map(|s| s.losers.len()).sum();
        metrics::CANDIDATES
            .with_label_values(&[category, "winner"])
            .inc_by(selections.len() as u64);
        metrics::CANDIDATES
            .with_label_values(&[category, "loser"])
            .inc_by(losers as u64);

        let (entries, stats) = reconcile_category(
            kind,
            cycle.state.entries(kind),
            &selections,
            self.linker.as_ref(),
        )
        .await;

        *cycle.state.entries_mut(kind) = entries;
        cycle.report_mut(kind).links = stats;
    }

    async fn discover(&self, root: PathBuf) -> Option<Vec<SourceFile>> {
        let extensions = self.library.video_extensions.clone();
        let walk_root = root.clone();
        match tokio::task::spawn_blocking(move || scanner::discover(&walk_root, &extensions)).await
        {
            Ok(files) => Some(files),
            Err(e) => {
                error!("Discovery under {} failed: {}", root.display(), e);
                None
            }
        }
    }

    fn target_for(&self, media: &ResolvedMedia, file: &SourceFile) -> Option<PathBuf> {
        match media.kind {
            MediaKind::Film => Some(
                self.layout
                    .film_target(&media.title, media.year, &file.extension),
            ),
            MediaKind::Episode => {
                let episode = media.episode.as_ref()?;
                Some(self.layout.episode_target(
                    &media.title,
                    media.year,
                    media.season.unwrap_or(1),
                    episode,
                    &file.extension,
                ))
            }
        }
    }

    fn reject(&self, cycle: &mut ScanCycle, kind: MediaKind, file: &SourceFile, reason: &str) {
        warn!("Skipping {}: {}", file.path.display(), reason);
        cycle.report_mut(kind).rejected += 1;
        metrics::CANDIDATES
            .with_label_values(&[kind.category(), "rejected"])
            .inc();
    }
}
