use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Scan interval is not 0
/// - Category directories are set and distinct
/// - Mount and output paths are absolute
/// - At least one video extension
/// - Server port is not 0 when the server is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.scan.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "scan.interval_secs cannot be 0".to_string(),
        ));
    }

    let library = &config.library;
    if library.films_dir.trim().is_empty() || library.shows_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "library.films_dir and library.shows_dir cannot be empty".to_string(),
        ));
    }
    if library.films_dir == library.shows_dir {
        return Err(ConfigError::ValidationError(
            "library.films_dir and library.shows_dir must differ".to_string(),
        ));
    }
    if !library.source_mount.is_absolute() {
        return Err(ConfigError::ValidationError(format!(
            "library.source_mount must be absolute, got {}",
            library.source_mount.display()
        )));
    }
    if !library.output_root.is_absolute() {
        return Err(ConfigError::ValidationError(format!(
            "library.output_root must be absolute, got {}",
            library.output_root.display()
        )));
    }
    if library.video_extensions.iter().all(|e| e.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "library.video_extensions cannot be empty".to_string(),
        ));
    }

    if config.server.enabled && config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
