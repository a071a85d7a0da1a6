//! Error types for the loader
//!
//! Extraction never fails on malformed rows (those are dropped); the variants
//! here cover configuration, the network, the PDF decoder and the store.

use thiserror::Error;

/// Result type alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    /// Required setting missing or invalid
    #[error("Configuration error: {0}. Check TROUT_PDF_URL and TROUT_DATABASE_URL.")]
    Config(String),

    /// Shared helper failure (settings, serialization)
    #[error(transparent)]
    Common(#[from] trout_common::TroutError),

    /// HTTP request failed before a response arrived, or mid-body
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Failed to download {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Body does not start with the `%PDF` signature
    #[error("Downloaded content does not appear to be a PDF.")]
    NotPdf,

    /// The PDF text layer could not be decoded
    #[error("Failed to read PDF text layer: {0}")]
    TextLayer(String),

    /// SQL statement or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Target table name is not a plain SQL identifier
    #[error("Invalid table name '{0}': expected letters, digits, '_' and an optional schema prefix")]
    InvalidTable(String),

    /// Cancellation was requested before the run finished
    #[error("Run cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a text layer error
    pub fn text_layer(message: impl Into<String>) -> Self {
        Self::TextLayer(message.into())
    }
}
