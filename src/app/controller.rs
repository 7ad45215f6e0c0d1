use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::TomlConfigStore;
use crate::domain::{AppConfig, DomainError};
use crate::infrastructure::logging::init_logging;
use crate::ports::ConfigStore;

/// Application controller that owns configuration and process-wide setup.
pub struct AppController {
    config: RwLock<AppConfig>,
    config_store: Arc<TomlConfigStore>,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize the application controller.
    /// This sets up the config store, loads configuration, and starts logging.
    pub fn new() -> Result<Self, DomainError> {
        let config_store = Arc::new(TomlConfigStore::new()?);
        let config = config_store.load()?;

        let log_guard = init_logging(&config_store.logs_dir(), &config.logging)?;

        info!("Parlance starting up");

        Ok(Self {
            config: RwLock::new(config),
            config_store,
            _log_guard: log_guard,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> AppConfig {
        self.config.read().clone()
    }

    /// Update the configuration, persisting it to disk.
    pub fn update_config(&self, config: AppConfig) -> Result<(), DomainError> {
        self.config_store.save(&config)?;
        *self.config.write() = config;

        info!("Configuration updated");
        Ok(())
    }

    /// Flip the persisted dark-mode preference and return the new value.
    pub fn toggle_dark_mode(&self) -> Result<bool, DomainError> {
        let mut config = self.config();
        config.ui.dark_mode = !config.ui.dark_mode;
        let dark = config.ui.dark_mode;
        self.update_config(config)?;

        info!(dark_mode = dark, "Theme toggled");
        Ok(dark)
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    /// Get the config file path.
    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }

    /// Get the default directory for downloaded translation audio.
    pub fn downloads_dir(&self) -> std::path::PathBuf {
        self.config_store.downloads_dir()
    }
}
