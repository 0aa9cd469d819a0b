use std::sync::Arc;
use reelink_core::{Config, Organiser, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    organiser: Arc<Organiser>,
}

impl AppState {
    pub fn new(config: Config, organiser: Arc<Organiser>) -> Self {
        Self { config, organiser }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn organiser(&self) -> &Organiser {
        self.organiser.as_ref()
    }
}
