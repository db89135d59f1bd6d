//! Error types for realest_app

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up the landing page
#[derive(Error, Debug)]
pub enum AppError {
    /// The configuration file exists but could not be read
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a site config
    #[error("Failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configured value is out of range
    #[error("Invalid config value for {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Error from the core primitives (persistence, parsing)
    #[error(transparent)]
    Core(#[from] realest_core::CoreError),
}

/// Result type for realest_app operations
pub type Result<T> = std::result::Result<T, AppError>;
