use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Config file read when no path is given. It may be absent.
pub const DEFAULT_CONFIG_FILE: &str = "reelink.toml";

/// Plain variables from older deployments and the keys they set.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("TMDB_API_KEY", "tmdb.api_key"),
    ("SCAN_INTERVAL_SECS", "scan.interval_secs"),
    ("JELLYFIN_ZURG_PATH", "library.consumer_mount"),
];

/// Load configuration from defaults, an optional TOML file and the
/// environment.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// read if present.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let toml = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            Toml::file(path)
        }
        None => Toml::file(DEFAULT_CONFIG_FILE),
    };

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(toml)
        .merge(Env::prefixed("REELINK_").split("__"))
        .merge(legacy_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key == *name)
            .map(|(_, mapped)| (*mapped).into())
            .unwrap_or_else(|| key.as_str().into())
    })
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
