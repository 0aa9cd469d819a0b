//! Persisted state types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parser::{EpisodeNumber, MediaKind};
use crate::selector::Candidate;

/// One linked source file.
///
/// The flattened metadata is informational; only `target` drives behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub target: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<EpisodeNumber>,
    #[serde(default)]
    pub score: u32,
}

impl From<&Candidate> for PersistedEntry {
    fn from(candidate: &Candidate) -> Self {
        Self {
            target: candidate.target_key(),
            title: candidate.media.title.clone(),
            year: candidate.media.year,
            season: candidate.media.season,
            episode: candidate.media.episode.clone(),
            score: candidate.media.score,
        }
    }
}

/// Source path to entry, per category.
///
/// Ordered maps keep the serialized file stable between saves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryState {
    #[serde(default)]
    pub films: BTreeMap<String, PersistedEntry>,
    #[serde(default)]
    pub shows: BTreeMap<String, PersistedEntry>,
}

impl LibraryState {
    pub fn entries(&self, kind: MediaKind) -> &BTreeMap<String, PersistedEntry> {
        match kind {
            MediaKind::Film => &self.films,
            MediaKind::Episode => &self.shows,
        }
    }

    pub fn entries_mut(&mut self, kind: MediaKind) -> &mut BTreeMap<String, PersistedEntry> {
        match kind {
            MediaKind::Film => &mut self.films,
            MediaKind::Episode => &mut self.shows,
        }
    }

    /// Total number of tracked sources.
    pub fn len(&self) -> usize {
        self.films.len() + self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
