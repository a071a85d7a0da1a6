//! Weekly Trout Stocking Report extraction
//!
//! The report is a PDF whose table has no delimiters: each data line is a date,
//! a county and a waterbody separated by whitespace. Column gaps survive in some
//! text layers and collapse to single spaces in others, so the county/waterbody
//! split tries the wide-gap reading first and falls back to the first space.
//!
//! Lines that are not rows (letterhead, footers, notes) are dropped, never
//! reported as errors. A missing report date range is returned as an empty
//! string and judged by the caller.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{LoaderError, Result};
use crate::text_layer::pdf_text_lines;

/// Canonical stocking date format.
pub const STOCKING_DATE_FORMAT: &str = "%m/%d/%Y";

/// Prefixes of letterhead lines that appear between table rows.
const BOILERPLATE_PREFIXES: [&str; 2] = ["GEORGIA DEPARTMENT", "WILDLIFE RESOURCES"];

/// Tokens that must all appear on the table header line.
const HEADER_TOKENS: [&str; 3] = ["DATE", "COUNTY", "WATERBODY"];

/// One stocking event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockingRow {
    /// `MM/DD/YYYY`
    pub stocking_date: String,
    /// May hold several counties separated by `/`
    pub county: String,
    pub waterbody: String,
}

impl StockingRow {
    pub fn new(
        stocking_date: impl Into<String>,
        county: impl Into<String>,
        waterbody: impl Into<String>,
    ) -> Self {
        Self {
            stocking_date: stocking_date.into(),
            county: county.into(),
            waterbody: waterbody.into(),
        }
    }
}

/// Report date range plus its rows, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReport {
    /// e.g. `12/15/2025 - 12/19/2025`; empty when the title was not found
    pub report_dates: String,
    pub rows: Vec<StockingRow>,
}

impl ExtractedReport {
    pub fn has_report_dates(&self) -> bool {
        !self.report_dates.trim().is_empty()
    }
}

/// Line-oriented parser for the report text
pub struct StockingReportParser {
    report_dates: Regex,
    row: Regex,
    wide_gap: Regex,
    whitespace: Regex,
}

impl StockingReportParser {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        let report_dates = RegexBuilder::new(
            r"Weekly\s+Trout\s+Stocking\s+Report:\s*(?P<range>\d{1,2}/\d{1,2}/\d{4}\s*-\s*\d{1,2}/\d{1,2}/\d{4})",
        )
        .case_insensitive(true)
        .build()?;

        Ok(Self {
            report_dates,
            row: Regex::new(r"^(?P<date>\d{1,2}/\d{1,2}/\d{4})\s+(?P<rest>.+)$")?,
            wide_gap: Regex::new(r"\s{2,}")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Extract the report date range and the table rows from decoded lines.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> ExtractedReport {
        let full_text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");

        ExtractedReport {
            report_dates: self.report_dates(&full_text),
            rows: self.rows(lines),
        }
    }

    /// First `Weekly Trout Stocking Report: D/D/YYYY - D/D/YYYY` range, trimmed.
    pub fn report_dates(&self, text: &str) -> String {
        self.report_dates
            .captures(text)
            .and_then(|caps| caps.name("range"))
            .map(|range| range.as_str().trim().to_string())
            .unwrap_or_default()
    }

    /// Parse every row after the table header.
    ///
    /// Without a header line the whole document is scanned.
    pub fn rows<S: AsRef<str>>(&self, lines: &[S]) -> Vec<StockingRow> {
        let start = header_index(lines).map_or(0, |i| i + 1);

        lines[start..]
            .iter()
            .filter_map(|line| self.parse_row(line.as_ref()))
            .collect()
    }

    /// Parse one candidate line; `None` for anything that is not a row.
    pub fn parse_row(&self, raw: &str) -> Option<StockingRow> {
        let line = self.normalize(raw);

        if line.is_empty() || is_boilerplate(&line) {
            return None;
        }

        let caps = self.row.captures(&line)?;
        let date = caps.name("date")?.as_str();
        let stocking_date = canonical_stocking_date(date)?;

        let rest = caps.name("rest")?.as_str().trim();
        let (county, waterbody) = self.split_county_and_waterbody(rest);

        Some(StockingRow {
            stocking_date,
            county,
            waterbody,
        })
    }

    /// Split a row remainder into county and waterbody.
    ///
    /// Runs of two or more whitespace characters are taken as column gaps;
    /// with fewer than two segments the split falls back to the first space.
    pub fn split_county_and_waterbody(&self, rest: &str) -> (String, String) {
        let segments: Vec<String> = self
            .wide_gap
            .split(rest)
            .map(|segment| self.normalize(segment))
            .filter(|segment| !segment.is_empty())
            .collect();

        if let [county, waterbody @ ..] = segments.as_slice() {
            if !waterbody.is_empty() {
                return (county.clone(), waterbody.join(" "));
            }
        }

        let rest = self.normalize(rest);
        match rest.split_once(' ') {
            Some((county, waterbody)) => (county.to_string(), waterbody.to_string()),
            None => (rest, String::new()),
        }
    }

    /// Collapse whitespace runs to one space and trim.
    pub fn normalize(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").trim().to_string()
    }
}

/// Index of the first line containing DATE, COUNTY and WATERBODY in any case.
pub fn header_index<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    lines.iter().position(|line| {
        let upper = line.as_ref().to_uppercase();
        HEADER_TOKENS.iter().all(|token| upper.contains(token))
    })
}

fn is_boilerplate(line: &str) -> bool {
    let upper = line.to_uppercase();
    BOILERPLATE_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}

/// Parse `M/D/YYYY` or `MM/DD/YYYY` and render it as `MM/DD/YYYY`.
pub fn canonical_stocking_date(token: &str) -> Option<String> {
    let token = token.trim();
    // chrono's %m and %d accept one or two digits, covering both input widths
    NaiveDate::parse_from_str(token, "%m/%d/%Y")
        .ok()
        .filter(|_| is_mdy_shape(token))
        .map(|date| date.format(STOCKING_DATE_FORMAT).to_string())
}

/// 1-2 digit month, 1-2 digit day, 4 digit year.
fn is_mdy_shape(token: &str) -> bool {
    let parts: Vec<&str> = token.split('/').collect();
    matches!(parts.as_slice(), [m, d, y]
        if (1..=2).contains(&m.len())
            && (1..=2).contains(&d.len())
            && y.len() == 4
            && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())))
}

/// Turns a report document into rows
#[async_trait]
pub trait ReportExtractor: Send + Sync {
    async fn extract(&self, pdf: &[u8], cancel: &CancellationToken) -> Result<ExtractedReport>;
}

/// Decodes the PDF text layer and runs [`StockingReportParser`] over it
pub struct PdfReportExtractor {
    parser: std::sync::Arc<StockingReportParser>,
}

impl PdfReportExtractor {
    pub fn new() -> Result<Self> {
        let parser = StockingReportParser::new()
            .map_err(|e| LoaderError::text_layer(format!("invalid row pattern: {}", e)))?;

        Ok(Self {
            parser: std::sync::Arc::new(parser),
        })
    }
}

#[async_trait]
impl ReportExtractor for PdfReportExtractor {
    async fn extract(&self, pdf: &[u8], cancel: &CancellationToken) -> Result<ExtractedReport> {
        if cancel.is_cancelled() {
            return Err(LoaderError::Cancelled);
        }

        // The decoder is synchronous and CPU-bound
        let pdf = pdf.to_vec();
        let parser = self.parser.clone();
        let task = tokio::task::spawn_blocking(move || {
            pdf_text_lines(&pdf).map(|lines| parser.extract(lines.as_slice()))
        });

        match task.await {
            Ok(report) => report,
            Err(e) => Err(LoaderError::text_layer(format!("extraction task failed: {}", e))),
        }
    }
}
