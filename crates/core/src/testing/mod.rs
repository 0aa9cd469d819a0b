//! Testing utilities and test doubles.
//!
//! This module provides doubles for the organiser's seams so scan cycles can
//! be exercised against real temp directories without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelink_core::testing::{fixtures, MemoryStateStore, MockExternalCatalog, RecordingLinker};
//!
//! let catalog = MockExternalCatalog::new();
//! catalog.add_film("Heat", CanonicalTitle::new("Heat", Some(1995))).await;
//!
//! let linker = RecordingLinker::new(FsLinker::with_defaults());
//! let store = MemoryStateStore::new();
//!
//! // Build an Organiser from these and run a cycle...
//! assert_eq!(linker.write_count().await, 0);
//! ```

mod memory_state_store;
mod mock_external_catalog;
mod recording_linker;

pub use memory_state_store::MemoryStateStore;
pub use mock_external_catalog::{MockExternalCatalog, RecordedLookup};
pub use recording_linker::{RecordedLink, RecordingLinker};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::config::{Config, LibraryConfig, ScanConfig, StateConfig};

    /// Create a small file at `root/relative`, creating parent directories.
    pub fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        fs::write(&path, b"video").expect("write fixture file");
        path
    }

    /// Config rooted in a temp directory: sources under `root/zurg`, the
    /// library under `root/media`, state at `root/state.json`.
    pub fn temp_config(root: &Path) -> Config {
        Config {
            library: LibraryConfig {
                source_mount: root.join("zurg"),
                consumer_mount: root.join("zurg"),
                output_root: root.join("media"),
                ..LibraryConfig::default()
            },
            scan: ScanConfig {
                interval_secs: 1,
                mount_wait_attempts: 1,
                mount_wait_interval_secs: 0,
            },
            state: StateConfig {
                path: root.join("state.json"),
            },
            ..Config::default()
        }
    }

    /// Add a film source file under the films category of `config`.
    pub fn film_source(config: &Config, relative: &str) -> PathBuf {
        touch(
            &config.library.source_root(crate::parser::MediaKind::Film),
            relative,
        )
    }

    /// Add an episode source file under the shows category of `config`.
    pub fn show_source(config: &Config, relative: &str) -> PathBuf {
        touch(
            &config.library.source_root(crate::parser::MediaKind::Episode),
            relative,
        )
    }
}
