use std::path::Path;

use anyhow::{Context, Result};

use restack_lib::config::MigrationConfig;

/// Shared state for CLI commands
pub struct App {
    pub config: MigrationConfig,
}

impl App {
    /// Load settings from `config_path`, or use the defaults
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => MigrationConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MigrationConfig::default(),
        };
        log::debug!("Using config: {:?}", config);
        Ok(Self { config })
    }
}
