//! Turns a discovered file into canonical library metadata.
//!
//! Films are guessed from their raw name. Episodes are guessed from
//! "{folder} {file name}" with a fallback pass over the file name alone, so
//! season packs whose folder carries the title and whose files carry the
//! episode marker still resolve. A file that parses but is not usable is
//! rejected rather than guessed at.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::external_catalog::{CanonicalTitle, ExternalCatalog};
use crate::metrics;
use crate::naming;
use crate::parser::{EpisodeNumber, MediaKind, NameParser, ParsedName, RuleParser};
use crate::quality;
use crate::scanner::SourceFile;

/// Metadata for a file that can be placed in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<u32>,
    /// Always set for episodes.
    pub season: Option<u32>,
    /// Always set for episodes.
    pub episode: Option<EpisodeNumber>,
    pub score: u32,
    /// Whether the title came from an external catalog.
    pub verified: bool,
}

/// Why a file was left out of the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Episode file with no recognizable episode number.
    MissingEpisode,
    /// Nothing usable remains of the title after sanitizing.
    EmptyTitle,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEpisode => f.write_str("could not determine episode number"),
            Self::EmptyTitle => f.write_str("could not determine a usable title"),
        }
    }
}

/// Result of classifying a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Resolved(ResolvedMedia),
    Rejected(RejectReason),
}

/// Classifies source files using a name parser and an optional catalog.
pub struct NameResolver {
    parser: Arc<dyn NameParser>,
    catalog: Option<Arc<dyn ExternalCatalog>>,
}

impl NameResolver {
    pub fn new(parser: Arc<dyn NameParser>, catalog: Option<Arc<dyn ExternalCatalog>>) -> Self {
        Self { parser, catalog }
    }

    /// Resolver using the built-in [`RuleParser`].
    pub fn with_catalog(catalog: Option<Arc<dyn ExternalCatalog>>) -> Self {
        Self::new(Arc::new(RuleParser::new()), catalog)
    }

    /// Classify a file as the given kind.
    pub async fn classify(&self, file: &SourceFile, kind: MediaKind) -> Classification {
        match kind {
            MediaKind::Film => self.classify_film(file).await,
            MediaKind::Episode => self.classify_episode(file).await,
        }
    }

    async fn classify_film(&self, file: &SourceFile) -> Classification {
        let parsed = self.parser.parse(&file.raw_name, MediaKind::Film);
        let score = quality::score(&parsed, &file.raw_name);

        let title = parsed.title.clone().unwrap_or_else(|| file.raw_name.clone());
        let (title, year, verified) = self.verify(MediaKind::Film, title, parsed.year).await;

        if naming::sanitize(&title).is_empty() {
            return Classification::Rejected(RejectReason::EmptyTitle);
        }

        Classification::Resolved(ResolvedMedia {
            kind: MediaKind::Film,
            title,
            year,
            season: None,
            episode: None,
            score,
            verified,
        })
    }

    async fn classify_episode(&self, file: &SourceFile) -> Classification {
        let full_guess = if file.nested {
            format!("{} {}", file.raw_name, file.file_name)
        } else {
            file.file_name.clone()
        };

        let mut parsed = self.parser.parse(&full_guess, MediaKind::Episode);
        let file_parse = if file.nested {
            self.parser.parse(&file.file_name, MediaKind::Episode)
        } else {
            parsed.clone()
        };

        if parsed.episode.is_none() {
            merge_fallback(&mut parsed, &file_parse, &file.raw_name);
        }

        let Some(episode) = parsed.episode.clone() else {
            return Classification::Rejected(RejectReason::MissingEpisode);
        };

        let score = quality::score(&file_parse, &file.file_name);
        let season = parsed.season.unwrap_or(1);
        let title = parsed.title.clone().unwrap_or_else(|| file.raw_name.clone());
        let (title, year, verified) = self.verify(MediaKind::Episode, title, parsed.year).await;

        if naming::sanitize(&title).is_empty() {
            return Classification::Rejected(RejectReason::EmptyTitle);
        }

        Classification::Resolved(ResolvedMedia {
            kind: MediaKind::Episode,
            title,
            year,
            season: Some(season),
            episode: Some(episode),
            score,
            verified,
        })
    }

    /// Replace title and year with the catalog's canonical values when found.
    ///
    /// Lookup failures never reject a file; the parsed values are kept.
    async fn verify(
        &self,
        kind: MediaKind,
        title: String,
        year: Option<u32>,
    ) -> (String, Option<u32>, bool) {
        let Some(catalog) = &self.catalog else {
            return (title, year, false);
        };

        let lookup = match kind {
            MediaKind::Film => catalog.search_film(&title, year).await,
            MediaKind::Episode => catalog.search_show(&title, year).await,
        };

        match lookup {
            Ok(Some(CanonicalTitle {
                title: canonical,
                year: canonical_year,
            })) => {
                metrics::CATALOG_LOOKUPS
                    .with_label_values(&[catalog.name(), "found"])
                    .inc();
                debug!("{} verified '{}' as '{}'", catalog.name(), title, canonical);
                (canonical, canonical_year.or(year), true)
            }
            Ok(None) => {
                metrics::CATALOG_LOOKUPS
                    .with_label_values(&[catalog.name(), "not_found"])
                    .inc();
                debug!("{} has no match for '{}'", catalog.name(), title);
                (title, year, false)
            }
            Err(e) => {
                metrics::CATALOG_LOOKUPS
                    .with_label_values(&[catalog.name(), "error"])
                    .inc();
                warn!("{} lookup failed for '{}': {}", catalog.name(), title, e);
                (title, year, false)
            }
        }
    }
}

/// Fill gaps in an episode parse from a parse of the file name alone.
///
/// The episode always comes from the fallback. Title, year and season are
/// only taken when the primary parse had none (a title equal to the folder
/// name counts as none).
fn merge_fallback(primary: &mut ParsedName, fallback: &ParsedName, raw_name: &str) {
    primary.episode = fallback.episode.clone();

    let title_missing = primary.title.as_deref().is_none_or(|t| t == raw_name);
    if title_missing && fallback.title.is_some() {
        primary.title = fallback.title.clone();
    }
    if primary.year.is_none() {
        primary.year = fallback.year;
    }
    if primary.season.is_none() {
        primary.season = fallback.season;
    }
}
