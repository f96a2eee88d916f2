pub mod config_storage;
pub mod paths;
pub mod secret_storage;

pub use config_storage::ConfigStorage;
pub use paths::{CounselPaths, PathError};
pub use secret_storage::{SecretStorage, SecretStorageError};
