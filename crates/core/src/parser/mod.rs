//! Release-name parsing.
//!
//! Torrent release names are noisy: titles are glued to years, resolutions,
//! sources, codecs and group tags with dots, underscores and brackets. This
//! module turns such a name into a [`ParsedName`] on a best-effort basis.
//!
//! The [`NameParser`] trait is the seam: callers hold a `dyn NameParser` so
//! a different heuristic can be swapped in without touching the resolver.

mod rules;
mod types;

pub use rules::RuleParser;
pub use types::{EpisodeNumber, MediaKind, ParsedName};

/// Extracts structured metadata from a release name.
///
/// Parsing never fails. Fields the parser cannot find are left empty.
pub trait NameParser: Send + Sync {
    /// Parse `name` with a hint about what kind of item it should be.
    ///
    /// With [`MediaKind::Film`] episode markers are not looked for.
    fn parse(&self, name: &str, kind: MediaKind) -> ParsedName;
}
