//! Client configuration file storage.
//!
//! Loads `config.toml` from the counsel config directory. A missing file is
//! not an error: the defaults (local backend, default user) apply.

use std::fs;
use std::path::PathBuf;

use counsel_core::config::ClientConfig;
use counsel_core::error::Result;

use crate::paths::CounselPaths;

/// Storage for the client configuration file (config.toml).
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Creates a storage pointing at the default config path.
    pub fn new() -> Result<Self> {
        let path = CounselPaths::config_file()
            .map_err(|e| counsel_core::CounselError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Creates a storage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the client configuration, falling back to defaults when the
    /// file does not exist.
    pub fn load(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(target: "config_storage", "No config.toml found, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Persists the client configuration, creating the parent directory if
    /// needed.
    pub fn store(&self, config: &ClientConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
