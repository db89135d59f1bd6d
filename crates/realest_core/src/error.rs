//! Core error types

use thiserror::Error;

/// Errors raised by the core primitives
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading or writing persisted UI state failed
    #[error("Persistence I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted UI state could not be encoded or decoded
    #[error("Persisted state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A style value string could not be parsed
    #[error("Invalid style value '{0}'")]
    InvalidStyleValue(String),

    /// A color string could not be parsed
    #[error("Invalid color '{0}'")]
    InvalidColor(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
