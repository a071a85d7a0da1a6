//! Error types shared across the trout stocking crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, TroutError>;

/// Errors raised by the shared helpers
#[derive(Error, Debug)]
pub enum TroutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TroutError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
