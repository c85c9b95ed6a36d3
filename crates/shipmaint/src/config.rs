//! Configuration management for shipmaint.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "shipmaint";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "shipmaint.db";

/// Default key the document is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "entnt_shipMaintenance";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SHIPMAINT_`)
/// 2. TOML config file at `~/.config/shipmaint/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Maintenance reporting configuration.
    pub maintenance: MaintenanceConfig,
}

/// Which backend holds the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `SQLite` database file.
    #[default]
    Sqlite,
    /// Process memory; nothing survives exit.
    Memory,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend holding the document.
    pub backend: BackendKind,
    /// Path to the database file.
    /// Defaults to `~/.local/share/shipmaint/shipmaint.db`
    pub database_path: Option<PathBuf>,
    /// Key the document is stored under.
    pub storage_key: String,
    /// Largest serialized document accepted, in bytes.
    /// Set to 0 for unlimited.
    pub quota_bytes: usize,
}

/// Maintenance reporting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// A component is overdue when it was last maintained more than this
    /// many days ago.
    pub overdue_after_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            database_path: None, // Will be resolved to default at runtime
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            overdue_after_days: 180,
        }
    }
}

impl Config {
    /// Load configuration from all sources, reading the TOML file at
    /// `config_path` or the default location.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `SHIPMAINT_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SHIPMAINT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.storage_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage_key must not be empty".to_string(),
            });
        }

        if self.maintenance.overdue_after_days == 0 {
            return Err(Error::ConfigValidation {
                message: "overdue_after_days must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the quota, or `None` when unlimited.
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        if self.storage.quota_bytes == 0 {
            None
        } else {
            Some(self.storage.quota_bytes)
        }
    }
}
