//! Trout Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared logging, error handling and settings helpers for the trout stocking
//! workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`TroutError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Settings**: validation of required configuration values
//!
//! # Example
//!
//! ```no_run
//! use trout_common::settings::require_setting;
//!
//! fn pdf_url() -> trout_common::Result<String> {
//!     require_setting("TROUT_PDF_URL", std::env::var("TROUT_PDF_URL").ok())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod settings;

// Re-export commonly used types
pub use error::{Result, TroutError};
