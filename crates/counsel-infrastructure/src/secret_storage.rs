//! Secret configuration file storage.
//!
//! Provides loading and saving of the stored backend credential in
//! `~/.config/counsel/secret.json`.

use crate::paths::CounselPaths;
use counsel_core::config::SecretConfig;
use std::fs;
use std::path::PathBuf;

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Configuration file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Responsibilities:
/// - Load secret.json from ~/.config/counsel/
/// - Persist credential changes back to the same file
/// - Provide error handling for missing or invalid files
///
/// Does NOT:
/// - Validate the credential against the backend
/// - Handle encryption (plaintext JSON storage)
///
/// # Security Note
///
/// This storage reads and writes plaintext JSON. On Unix the file is written
/// with permissions 600 to prevent unauthorized access.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a new SecretStorage with the default path
    /// (~/.config/counsel/secret.json).
    ///
    /// # Returns
    ///
    /// - `Ok(SecretStorage)`: Successfully determined config path
    /// - `Err(SecretStorageError::ConfigDirNotFound)`: Could not find home directory
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = CounselPaths::secret_file()
            .map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a new SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Loads the stored API key, treating a missing or unreadable file as
    /// "no credential stored".
    pub fn load_api_key(&self) -> Option<String> {
        match self.load() {
            Ok(config) => config.api_key,
            Err(SecretStorageError::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(target: "secret_storage", "Failed to load secret file: {}", e);
                None
            }
        }
    }

    /// Persists the secret configuration, creating the parent directory if
    /// needed. On Unix the file is given permissions 600.
    pub fn store(&self, config: &SecretConfig) -> Result<(), SecretStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Returns the path to the secret file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
