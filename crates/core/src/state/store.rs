//! State persistence backends.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::types::LibraryState;
use super::StateError;

/// Loads and saves the library state.
pub trait StateStore: Send + Sync {
    /// Load the state. A missing or unreadable store yields an empty state.
    fn load(&self) -> LibraryState;

    /// Replace the stored state.
    fn save(&self, state: &LibraryState) -> Result<(), StateError>;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> LibraryState {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return LibraryState::default();
            }
            Err(e) => {
                warn!(
                    "Could not read state file {}: {}, starting fresh",
                    self.path.display(),
                    e
                );
                return LibraryState::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Corrupt state file {}: {}, starting fresh",
                    self.path.display(),
                    e
                );
                LibraryState::default()
            }
        }
    }

    fn save(&self, state: &LibraryState) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(state)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| StateError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        debug!(
            "Saved state ({} entries) to {}",
            state.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PersistedEntry;
    use tempfile::TempDir;

    fn sample_state() -> LibraryState {
        let mut state = LibraryState::default();
        state.films.insert(
            "/zurg/films/Movie/movie.mkv".to_string(),
            PersistedEntry {
                target: "/media/films/Movie (2020)/Movie (2020).mkv".to_string(),
                title: "Movie".to_string(),
                year: Some(2020),
                season: None,
                episode: None,
                score: 150,
            },
        );
        state
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = JsonStateStore::new(temp.path().join("state.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonStateStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = JsonStateStore::new(temp.path().join("nested/dir/state.json"));

        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_save_replaces_previous_state() {
        let temp = TempDir::new().unwrap();
        let store = JsonStateStore::new(temp.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        store.save(&LibraryState::default()).unwrap();

        assert!(store.load().is_empty());
        let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }
}
