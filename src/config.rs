//! Configuration loading and management
//!
//! Handles parsing of `taskpad.toml` in the data directory, and resolution
//! of the data directory itself.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;
use crate::store::DEFAULT_KEY;

/// File name of the config file inside the data directory
pub const CONFIG_FILE: &str = "taskpad.toml";

/// Fallback data directory when no platform directory is available
const FALLBACK_DIR: &str = ".taskpad";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Key the task list is stored under
    #[serde(default = "default_key")]
    pub key: String,

    /// How long to wait for the storage lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `taskpad.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        validate_key(&self.key)?;
        if self.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check that a storage key is usable as a file stem.
pub fn validate_key(key: &str) -> crate::error::Result<()> {
    if key.is_empty() {
        return Err(crate::error::Error::InvalidConfig(
            "storage.key cannot be empty".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(crate::error::Error::InvalidConfig(format!(
            "storage.key '{key}' must be alphanumeric, '-' or '_'"
        )));
    }
    Ok(())
}

/// Resolve the data directory.
///
/// Order: explicit override (`--dir` / `TASKPAD_DIR`), the platform data
/// directory, then `./.taskpad`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "taskpad")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}
