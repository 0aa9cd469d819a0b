//! Types produced by release-name parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of library item a file is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Film,
    Episode,
}

impl MediaKind {
    /// Category label, matching the state mapping and output directory names.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Film => "films",
            Self::Episode => "shows",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// Episode number of a file, either a single episode or an ordered run of
/// episodes packed into one file.
///
/// Serialized as a bare integer or a list so persisted state stays readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodeNumber {
    Single(u32),
    Multi(Vec<u32>),
}

impl EpisodeNumber {
    /// Build from parsed numbers, dropping repeats. Returns `None` when empty.
    pub fn from_numbers(numbers: Vec<u32>) -> Option<Self> {
        let mut unique: Vec<u32> = Vec::with_capacity(numbers.len());
        for n in numbers {
            if !unique.contains(&n) {
                unique.push(n);
            }
        }

        match unique.len() {
            0 => None,
            1 => Some(Self::Single(unique[0])),
            _ => Some(Self::Multi(unique)),
        }
    }

    /// All episode numbers in order.
    pub fn as_slice(&self) -> &[u32] {
        match self {
            Self::Single(n) => std::slice::from_ref(n),
            Self::Multi(ns) => ns,
        }
    }
}

/// Best-effort metadata extracted from a noisy release name.
///
/// Every field is optional; parsers never fail, they just leave fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub title: Option<String>,
    pub year: Option<u32>,
    pub season: Option<u32>,
    pub episode: Option<EpisodeNumber>,
    /// e.g. "1080p", "2160p".
    pub screen_size: Option<String>,
    /// e.g. "Blu-ray", "Web".
    pub source: Option<String>,
    /// e.g. "H.265".
    pub video_codec: Option<String>,
    #[serde(default)]
    pub audio_codec: Vec<String>,
    /// Remaining markers such as "Remux", "HDR10" or "Dolby Vision".
    #[serde(default)]
    pub other: Vec<String>,
}

impl ParsedName {
    /// Whether the given marker was found among `other`.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.other.iter().any(|m| m == marker)
    }

    /// Whether the given audio codec was found.
    pub fn has_audio(&self, codec: &str) -> bool {
        self.audio_codec.iter().any(|a| a == codec)
    }
}
