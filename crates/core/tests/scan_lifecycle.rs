//! Scan cycle integration tests.
//!
//! These tests run full cycles against real temp directories:
//! discover -> classify -> select -> link -> persist, and the cleanup of
//! vanished sources on later cycles.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use reelink_core::{
    config::Config,
    testing::{fixtures, MockExternalCatalog, RecordingLinker},
    CanonicalTitle, ExternalCatalog, FsLinker, JsonStateStore, LibraryState, LinkOutcome,
    MediaKind, MountRemap, NameResolver, Organiser, StateStore,
};

/// Test helper wiring an organiser to temp directories.
struct TestHarness {
    config: Config,
    linker: Arc<RecordingLinker>,
    catalog: Arc<MockExternalCatalog>,
    organiser: Organiser,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::build(false, |_| {})
    }

    fn with_catalog() -> Self {
        Self::build(true, |_| {})
    }

    fn build(use_catalog: bool, adjust: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = fixtures::temp_config(temp_dir.path());
        adjust(&mut config);

        let remap = MountRemap::new(
            config.library.source_mount.clone(),
            config.library.consumer_mount.clone(),
        );
        let linker = Arc::new(RecordingLinker::new(FsLinker::new(remap)));
        let catalog = Arc::new(MockExternalCatalog::new());
        let resolver = if use_catalog {
            NameResolver::with_catalog(Some(catalog.clone() as Arc<dyn ExternalCatalog>))
        } else {
            NameResolver::with_catalog(None)
        };
        let store = Arc::new(JsonStateStore::new(&config.state.path));

        let organiser = Organiser::new(&config, resolver, linker.clone(), store);

        Self {
            config,
            linker,
            catalog,
            organiser,
            _temp_dir: temp_dir,
        }
    }

    fn film(&self, relative: &str) -> PathBuf {
        fixtures::film_source(&self.config, relative)
    }

    fn show(&self, relative: &str) -> PathBuf {
        fixtures::show_source(&self.config, relative)
    }

    fn library(&self, kind: MediaKind, relative: &str) -> PathBuf {
        self.config.library.output_dir(kind).join(relative)
    }

    fn state(&self) -> LibraryState {
        JsonStateStore::new(&self.config.state.path).load()
    }

    fn state_bytes(&self) -> Vec<u8> {
        fs::read(&self.config.state.path).expect("state file should exist")
    }
}

fn link_target(link: &Path) -> PathBuf {
    fs::read_link(link).expect("expected a symlink")
}

fn key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// =============================================================================
// Duplicate resolution
// =============================================================================

#[tokio::test]
async fn test_duplicate_films_link_highest_score() {
    let harness = TestHarness::new();
    harness.film("Movie.2020.1080p.BluRay.x264-GRP/movie.mkv");
    let uhd = harness.film("Movie.2020.2160p.WEB-DL.HEVC-GRP/movie.mkv");

    let report = harness.organiser.run_cycle().await.unwrap();

    let link = harness.library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv");
    assert_eq!(link_target(&link), uhd);

    assert_eq!(report.films.discovered, 2);
    assert_eq!(report.films.duplicate_groups, 1);
    assert_eq!(report.films.losers, 1);
    assert_eq!(report.films.links.created, 1);

    let state = harness.state();
    assert_eq!(state.films.len(), 1);
    let entry = &state.films[&key(&uhd)];
    assert_eq!(entry.target, key(&link));
    assert_eq!(entry.score, 160);
}

#[tokio::test]
async fn test_title_words_resembling_markers_still_group() {
    let harness = TestHarness::new();
    harness.film("Uncut.Gems.2019.1080p.BluRay.x264-GRP/gems.mkv");
    let uhd = harness.film("Uncut.Gems.2019.2160p.WEB-DL.HEVC-OTHER/gems.mkv");

    let report = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(report.films.duplicate_groups, 1);
    let link = harness.library(MediaKind::Film, "Uncut Gems (2019)/Uncut Gems (2019).mkv");
    assert_eq!(link_target(&link), uhd);
}

#[tokio::test]
async fn test_tie_keeps_first_discovered_across_cycles() {
    let harness = TestHarness::new();
    let first = harness.film("Movie.2020.1080p.BluRay.x264-AAA/movie.mkv");
    harness.film("Movie.2020.1080p.BluRay.x264-BBB/movie.mkv");

    harness.organiser.run_cycle().await.unwrap();
    let link = harness.library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv");
    assert_eq!(link_target(&link), first);

    harness.linker.clear().await;
    harness.organiser.run_cycle().await.unwrap();
    assert_eq!(link_target(&link), first);
    assert_eq!(harness.linker.write_count().await, 0);
}

#[tokio::test]
async fn test_better_copy_replaces_existing_link() {
    let harness = TestHarness::new();
    let hd = harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");

    harness.organiser.run_cycle().await.unwrap();
    let link = harness.library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv");
    assert_eq!(link_target(&link), hd);

    let remux = harness.film("Movie.2020.2160p.UHD.BluRay.REMUX.HDR.HEVC/movie.mkv");
    let report = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(link_target(&link), remux);
    assert_eq!(report.films.links.replaced, 1);

    let state = harness.state();
    assert_eq!(state.films.len(), 1);
    assert!(state.films.contains_key(&key(&remux)));
}

#[tokio::test]
async fn test_different_extensions_are_separate_targets() {
    let harness = TestHarness::new();
    harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");
    harness.film("Movie.2020.720p.WEB/movie.mp4");

    let report = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(report.films.duplicate_groups, 0);
    assert!(harness
        .library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv")
        .symlink_metadata()
        .is_ok());
    assert!(harness
        .library(MediaKind::Film, "Movie (2020)/Movie (2020).mp4")
        .symlink_metadata()
        .is_ok());
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn test_second_cycle_writes_nothing() {
    let harness = TestHarness::new();
    harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");
    harness.film("Loose.Film.2018.720p.HDTV.mkv");
    harness.show("Show.S01.1080p.WEB-DL/Show.S01E01.1080p.WEB-DL.mkv");
    harness.show("Show.S01.1080p.WEB-DL/Show.S01E02.1080p.WEB-DL.mkv");

    let first = harness.organiser.run_cycle().await.unwrap();
    assert_eq!(first.writes(), 4);
    let state_after_first = harness.state_bytes();

    harness.linker.clear().await;
    let second = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(second.writes(), 0);
    assert!(harness.linker.recorded_links().await.is_empty());
    assert_eq!(second.films.links.unchanged, 2);
    assert_eq!(second.shows.links.unchanged, 2);
    assert_eq!(harness.state_bytes(), state_after_first);
}

#[tokio::test]
async fn test_missing_state_relinks_without_writes() {
    let harness = TestHarness::new();
    harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");
    harness.organiser.run_cycle().await.unwrap();

    fs::remove_file(&harness.config.state.path).unwrap();
    harness.linker.clear().await;
    harness.organiser.run_cycle().await.unwrap();

    let links = harness.linker.recorded_links().await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].outcome, Some(LinkOutcome::Unchanged));
    assert_eq!(harness.state().films.len(), 1);
}

// =============================================================================
// Cleanup
// =============================================================================

#[tokio::test]
async fn test_removed_source_is_evicted_and_swept() {
    let harness = TestHarness::new();
    let keep = harness.film("Keep.2019.1080p.BluRay.x264/keep.mkv");
    let gone = harness.film("Gone.2021.1080p.BluRay.x264/gone.mkv");

    harness.organiser.run_cycle().await.unwrap();
    let gone_dir = harness.library(MediaKind::Film, "Gone (2021)");
    assert!(gone_dir.exists());

    fs::remove_dir_all(gone.parent().unwrap()).unwrap();
    let report = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(report.sweep.broken_links_removed, 1);
    assert_eq!(report.sweep.directories_pruned, 1);
    assert_eq!(report.evicted, 1);
    assert!(!gone_dir.exists());
    assert!(harness.config.library.output_dir(MediaKind::Film).exists());

    let state = harness.state();
    assert_eq!(state.films.len(), 1);
    assert!(state.films.contains_key(&key(&keep)));
}

#[tokio::test]
async fn test_unavailable_mount_leaves_library_untouched() {
    let harness = TestHarness::new();
    harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");
    harness.organiser.run_cycle().await.unwrap();
    let before = harness.state();

    fs::remove_dir_all(&harness.config.library.source_mount).unwrap();
    fs::create_dir_all(&harness.config.library.source_mount).unwrap();
    let report = harness.organiser.run_cycle().await.unwrap();

    assert!(!report.mount_available);
    assert_eq!(report.sweep.broken_links_removed, 0);
    assert_eq!(report.evicted, 0);
    assert_eq!(harness.state(), before);
    assert!(harness
        .library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv")
        .symlink_metadata()
        .is_ok());
}

// =============================================================================
// Episodes
// =============================================================================

#[tokio::test]
async fn test_show_without_year() {
    let harness = TestHarness::new();
    let source = harness.show("Show.S02E05.720p.HDTV.x264.mkv");

    harness.organiser.run_cycle().await.unwrap();

    let link = harness.library(MediaKind::Episode, "Show/Season 02/Show S02E05.mkv");
    assert_eq!(link_target(&link), source);
}

#[tokio::test]
async fn test_multi_episode_file() {
    let harness = TestHarness::new();
    let source = harness.show("The.Show.2019.S01.1080p.WEB/The.Show.S01E03E04.1080p.WEB.mkv");

    harness.organiser.run_cycle().await.unwrap();

    let link = harness.library(
        MediaKind::Episode,
        "The Show (2019)/Season 01/The Show (2019) S01E03E04.mkv",
    );
    assert_eq!(link_target(&link), source);

    let state = harness.state();
    let entry = &state.shows[&key(&source)];
    assert_eq!(
        entry.episode,
        Some(reelink_core::EpisodeNumber::Multi(vec![3, 4]))
    );
}

#[tokio::test]
async fn test_episode_without_number_is_skipped() {
    let harness = TestHarness::new();
    harness.show("Show.S01.1080p/Show.Behind.The.Scenes.mkv");
    let episode = harness.show("Show.S01.1080p/Show.S01E01.1080p.mkv");

    let report = harness.organiser.run_cycle().await.unwrap();

    assert_eq!(report.shows.discovered, 2);
    assert_eq!(report.shows.rejected, 1);
    let state = harness.state();
    assert_eq!(state.shows.len(), 1);
    assert!(state.shows.contains_key(&key(&episode)));
}

// =============================================================================
// Verification and remapping
// =============================================================================

#[tokio::test]
async fn test_catalog_title_is_used_for_target() {
    let harness = TestHarness::with_catalog();
    harness
        .catalog
        .add_film("Alien", CanonicalTitle::new("Alien", Some(1979)))
        .await;
    let source = harness.film("Alien.1080p.BluRay.x264/alien.mkv");

    harness.organiser.run_cycle().await.unwrap();

    let link = harness.library(MediaKind::Film, "Alien (1979)/Alien (1979).mkv");
    assert_eq!(link_target(&link), source);
    assert_eq!(harness.catalog.recorded_lookups().await.len(), 1);
}

#[tokio::test]
async fn test_links_use_consumer_mount_path() {
    let harness = TestHarness::build(false, |config| {
        config.library.consumer_mount = PathBuf::from("/mnt/zurg");
    });
    harness.film("Movie.2020.1080p.BluRay.x264/movie.mkv");

    harness.organiser.run_cycle().await.unwrap();

    let link = harness.library(MediaKind::Film, "Movie (2020)/Movie (2020).mkv");
    assert_eq!(
        link_target(&link),
        PathBuf::from("/mnt/zurg/films/Movie.2020.1080p.BluRay.x264/movie.mkv")
    );

    // The consumer-view link is not mistaken for a broken one
    harness.linker.clear().await;
    let report = harness.organiser.run_cycle().await.unwrap();
    assert_eq!(report.sweep.broken_links_removed, 0);
    assert_eq!(report.writes(), 0);
    assert!(link.symlink_metadata().is_ok());
}
