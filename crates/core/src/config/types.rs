use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::external_catalog::TmdbConfig;
use crate::parser::MediaKind;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where media is read from and where the library is written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Mount point of the media as seen by this process.
    #[serde(default = "default_mount")]
    pub source_mount: PathBuf,
    /// Mount point of the same media as seen by the media server.
    #[serde(default = "default_mount")]
    pub consumer_mount: PathBuf,
    /// Root of the organised library.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Category directory for films, under both the source mount and the output root.
    #[serde(default = "default_films_dir")]
    pub films_dir: String,
    /// Category directory for shows, under both the source mount and the output root.
    #[serde(default = "default_shows_dir")]
    pub shows_dir: String,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

impl LibraryConfig {
    fn category_dir(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Film => &self.films_dir,
            MediaKind::Episode => &self.shows_dir,
        }
    }

    /// Directory scanned for source files of this kind.
    pub fn source_root(&self, kind: MediaKind) -> PathBuf {
        self.source_mount.join(self.category_dir(kind))
    }

    /// Directory the links of this kind are written under.
    pub fn output_dir(&self, kind: MediaKind) -> PathBuf {
        self.output_root.join(self.category_dir(kind))
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            source_mount: default_mount(),
            consumer_mount: default_mount(),
            output_root: default_output_root(),
            films_dir: default_films_dir(),
            shows_dir: default_shows_dir(),
            video_extensions: default_video_extensions(),
        }
    }
}

fn default_mount() -> PathBuf {
    PathBuf::from("/zurg")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("/media")
}

fn default_films_dir() -> String {
    "films".to_string()
}

fn default_shows_dir() -> String {
    "shows".to_string()
}

fn default_video_extensions() -> Vec<String> {
    [
        "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts", "vob",
        "iso", "m2ts",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Scan loop timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Seconds between scan cycles (default: 300)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// How many times to check for the source mount before the first scan (default: 60)
    #[serde(default = "default_mount_wait_attempts")]
    pub mount_wait_attempts: u32,
    /// Seconds between mount checks (default: 5)
    #[serde(default = "default_mount_wait_interval_secs")]
    pub mount_wait_interval_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            mount_wait_attempts: default_mount_wait_attempts(),
            mount_wait_interval_secs: default_mount_wait_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_mount_wait_attempts() -> u32 {
    60
}

fn default_mount_wait_interval_secs() -> u64 {
    5
}

/// State persistence configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("/app/data/state.json")
}

/// Observability server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    9464
}

/// Sanitized config for logs and API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub library: LibraryConfig,
    pub scan: ScanConfig,
    pub state: StateConfig,
    pub tmdb: SanitizedTmdbConfig,
    pub server: ServerConfig,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            library: config.library.clone(),
            scan: config.scan.clone(),
            state: config.state.clone(),
            tmdb: SanitizedTmdbConfig {
                api_key_configured: config.tmdb.is_enabled(),
                base_url: config.tmdb.base_url.clone(),
                timeout_secs: config.tmdb.timeout_secs,
            },
            server: config.server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.library.source_mount, PathBuf::from("/zurg"));
        assert_eq!(config.library.output_root, PathBuf::from("/media"));
        assert_eq!(config.library.video_extensions.len(), 14);
        assert_eq!(config.scan.interval_secs, 300);
        assert_eq!(config.state.path, PathBuf::from("/app/data/state.json"));
        assert!(!config.tmdb.is_enabled());
        assert_eq!(config.tmdb.timeout_secs, 10);
        assert!(!config.server.enabled);
        assert_eq!(config.server.port, 9464);
    }

    #[test]
    fn test_category_paths() {
        let library = LibraryConfig::default();
        assert_eq!(
            library.source_root(MediaKind::Film),
            PathBuf::from("/zurg/films")
        );
        assert_eq!(
            library.output_dir(MediaKind::Episode),
            PathBuf::from("/media/shows")
        );
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let mut config = Config::default();
        config.tmdb.api_key = "super-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.tmdb.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
