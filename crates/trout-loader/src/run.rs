//! Run command: fetch, extract, load
//!
//! The three capabilities are injected so tests can swap any of them. Steps run
//! strictly one after another; cancellation is honoured between steps and
//! between row inserts.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::error::{LoaderError, Result};
use crate::extract::{ExtractedReport, ReportExtractor};
use crate::fetch::ReportFetcher;
use crate::store::StockingWriter;

/// Printed on stderr when the report title is missing.
pub const MISSING_REPORT_DATES_MESSAGE: &str =
    "Could not find 'Weekly Trout Stocking Report: ...' header in extracted text.";

/// How a run that did not error ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Rows were loaded; holds the number newly inserted
    Inserted(u64),
    /// No report date range in the document; nothing was written
    ReportDatesMissing,
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Inserted(_) => 0,
            RunOutcome::ReportDatesMissing => 1,
        }
    }

    /// Line shown to the operator
    pub fn message(self) -> String {
        match self {
            RunOutcome::Inserted(n) => format!("Inserted new rows: {}", n),
            RunOutcome::ReportDatesMissing => MISSING_REPORT_DATES_MESSAGE.to_string(),
        }
    }
}

pub struct RunCommand<F, E, W> {
    fetcher: F,
    extractor: E,
    writer: W,
}

impl<F, E, W> RunCommand<F, E, W>
where
    F: ReportFetcher,
    E: ReportExtractor,
    W: StockingWriter,
{
    pub fn new(fetcher: F, extractor: E, writer: W) -> Self {
        Self {
            fetcher,
            extractor,
            writer,
        }
    }

    /// Fetch and extract without touching the store
    #[instrument(skip(self, cancel))]
    pub async fn extract_only(&self, url: &str, cancel: &CancellationToken) -> Result<ExtractedReport> {
        ensure_not_cancelled(cancel)?;
        info!("Downloading PDF");
        let pdf = self.fetcher.fetch(url, cancel).await?;

        ensure_not_cancelled(cancel)?;
        info!(bytes = pdf.len(), "Extracting PDF rows");
        let report = self.extractor.extract(&pdf, cancel).await?;

        if report.has_report_dates() {
            info!(
                report_dates = %report.report_dates,
                row_count = report.rows.len(),
                "Extraction complete"
            );
        }

        Ok(report)
    }

    /// Full run: fetch, extract, and insert the new rows
    #[instrument(skip(self, cancel))]
    pub async fn execute(&self, url: &str, cancel: &CancellationToken) -> Result<RunOutcome> {
        info!("Run starting");

        let report = self.extract_only(url, cancel).await?;

        if !report.has_report_dates() {
            error!("Could not find report header date range");
            return Ok(RunOutcome::ReportDatesMissing);
        }

        ensure_not_cancelled(cancel)?;
        let inserted = self
            .writer
            .insert_new_rows(&report.report_dates, &report.rows, cancel)
            .await?;

        info!(inserted, "Run completed successfully");

        Ok(RunOutcome::Inserted(inserted))
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(LoaderError::Cancelled)
    } else {
        Ok(())
    }
}
