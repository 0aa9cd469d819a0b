//! Duplicate-aware symlink organiser for media server libraries.
//!
//! Source files from a remote mount are classified as films or episodes,
//! grouped by the library slot they would occupy, and the best copy of each
//! slot is exposed through a symlink at a media-server-friendly path.

pub mod config;
pub mod external_catalog;
pub mod linker;
pub mod metrics;
pub mod naming;
pub mod organiser;
pub mod parser;
pub mod quality;
pub mod reconcile;
pub mod resolver;
pub mod scanner;
pub mod selector;
pub mod state;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use external_catalog::{CanonicalTitle, ExternalCatalog, ExternalCatalogError, TmdbClient};
pub use linker::{FsLinker, LinkError, LinkOutcome, Linker, MountRemap, SweepReport};
pub use organiser::{Organiser, OrganiserError, OrganiserStatus, ScanReport};
pub use parser::{EpisodeNumber, MediaKind, NameParser, ParsedName, RuleParser};
pub use resolver::{Classification, NameResolver, ResolvedMedia};
pub use scanner::SourceFile;
pub use state::{JsonStateStore, LibraryState, PersistedEntry, StateError, StateStore};
