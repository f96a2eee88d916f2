//! Unified path management for counsel configuration files.
//!
//! All counsel configuration and the stored credential live under the
//! platform config directory (e.g. `~/.config/counsel/` on Linux).

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for counsel.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/counsel/           # Config directory
/// ├── config.toml              # Client configuration (base URL, user id)
/// └── secret.json              # Stored API key
/// ```
pub struct CounselPaths;

impl CounselPaths {
    /// Returns the counsel configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/counsel/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("counsel"))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the client configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
