pub mod case;
pub mod config;
pub mod error;
pub mod notify;
pub mod observe;

// Re-export common error type
pub use error::{CounselError, Result};
