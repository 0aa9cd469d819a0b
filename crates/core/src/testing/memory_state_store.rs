//! In-memory state store for testing.

use std::sync::Mutex;

use crate::state::{LibraryState, StateError, StateStore};

/// Keeps the state in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<LibraryState>,
    saves: Mutex<usize>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing state.
    pub fn with_state(state: LibraryState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: Mutex::new(0),
        }
    }

    /// The currently stored state.
    pub fn snapshot(&self) -> LibraryState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> LibraryState {
        self.snapshot()
    }

    fn save(&self, state: &LibraryState) -> Result<(), StateError> {
        if let Ok(mut stored) = self.state.lock() {
            *stored = state.clone();
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
