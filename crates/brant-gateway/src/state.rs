use std::sync::Arc;

use brant_config::AppConfig;
use brant_db::Migrator;

/// Shared application state accessible from all request handlers.
pub struct AppState {
    pub config: AppConfig,
    pub migrator: Migrator,
}

impl AppState {
    pub fn new(config: AppConfig, migrator: Migrator) -> Self {
        Self { config, migrator }
    }
}

pub type SharedState = Arc<AppState>;
