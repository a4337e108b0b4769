//! Configuration types.
//!
//! Settings come from an optional `config.toml`; every field has a default so
//! an empty or missing file yields a working engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Executor settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Where selections and history are persisted
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&source)
    }
}

/// Executor settings for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Selection ceiling.
    pub max_selection: usize,

    /// Items dispatched concurrently per batch.
    pub batch_size: usize,

    /// Pause between batches, in milliseconds.
    pub batch_delay_ms: u64,

    /// Per-item call budget, in milliseconds.
    pub item_timeout_ms: u64,

    /// History entries retained.
    pub history_limit: usize,

    pub enable_undo: bool,
    pub enable_progress_tracking: bool,
    pub enable_validation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_selection: 100,
            batch_size: 10,
            batch_delay_ms: 100,
            item_timeout_ms: 30_000,
            history_limit: 50,
            enable_undo: true,
            enable_progress_tracking: true,
            enable_validation: true,
        }
    }
}

impl EngineConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    /// Reject settings the executor cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_selection == 0 {
            return Err(ConfigError::Invalid {
                field: "max_selection",
                message: "must be at least 1".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "batch_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.item_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "item_timeout_ms",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted state. Defaults to `data_dir()`.
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the storage directory.
    pub fn resolve_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir().ok_or(ConfigError::NoConfigDir),
        }
    }
}

/// Get the path to config.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bulk"))
}

/// Get the directory for persisted selections and history.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("bulk"))
}
