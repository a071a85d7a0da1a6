//! Trout Loader Library
//!
//! Loads the Georgia DNR Weekly Trout Stocking Report into a SQL table.
//!
//! # Pipeline
//!
//! - **Fetch** ([`fetch`]): download the PDF, reject anything without a `%PDF` signature
//! - **Extract** ([`extract`]): decode the text layer and recover the table rows
//! - **Load** ([`store`]): insert each row unless its (date, county, waterbody) is stored
//!
//! # Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use trout_loader::{
//!     config::{ConfigOverrides, LoaderConfig},
//!     extract::PdfReportExtractor,
//!     fetch::HttpReportFetcher,
//!     run::RunCommand,
//!     store::SqlStockingWriter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = LoaderConfig::load(ConfigOverrides::default())?;
//!     let command = RunCommand::new(
//!         HttpReportFetcher::from_config(&config)?,
//!         PdfReportExtractor::new()?,
//!         SqlStockingWriter::from_config(&config)?,
//!     );
//!
//!     let outcome = command.execute(&config.pdf_url, &CancellationToken::new()).await?;
//!     println!("{}", outcome.message());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod run;
pub mod store;
pub mod text_layer;

pub use error::{LoaderError, Result};

/// Pretty JSON for the `extract` command
pub fn report_json(report: &extract::ExtractedReport) -> trout_common::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
