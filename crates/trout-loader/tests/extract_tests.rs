//! Extraction scenarios over decoded report lines

use tokio_util::sync::CancellationToken;
use trout_loader::extract::{PdfReportExtractor, ReportExtractor, StockingReportParser, StockingRow};
use trout_loader::text_layer::pdf_text_lines;

/// One-page report with a text layer: boilerplate, title, header, two rows
const WEEKLY_REPORT_PDF: &[u8] = include_bytes!("fixtures/weekly_report.pdf");

fn parser() -> StockingReportParser {
    StockingReportParser::new().unwrap()
}

#[test]
fn test_header_found_scenario() {
    let lines = [
        "Weekly Trout Stocking Report: 12/15/2025 - 12/19/2025",
        "Streams and lakes stocked this week",
        "    DATE          COUNTY          WATERBODY",
        "12/15/2025 Forsyth  Lanier Tailwater",
        "12/16/2025 Hall  Chattahoochee",
    ];

    let report = parser().extract(&lines);

    assert_eq!(report.report_dates, "12/15/2025 - 12/19/2025");
    assert_eq!(
        report.rows,
        vec![
            StockingRow::new("12/15/2025", "Forsyth", "Lanier Tailwater"),
            StockingRow::new("12/16/2025", "Hall", "Chattahoochee"),
        ]
    );
}

#[test]
fn test_report_dates_span_lines() {
    // Title and range split across lines by the text layer
    let lines = [
        "Weekly Trout Stocking Report:",
        "1/5/2026 - 1/9/2026",
        "DATE COUNTY WATERBODY",
        "1/5/2026 Rabun Tallulah River",
    ];

    let report = parser().extract(&lines);

    assert_eq!(report.report_dates, "1/5/2026 - 1/9/2026");
    assert_eq!(report.rows.len(), 1);
}

#[test]
fn test_missing_report_title_yields_empty_dates() {
    let lines = [
        "Georgia trout stocking",
        "DATE COUNTY WATERBODY",
        "12/15/2025 Forsyth  Lanier Tailwater",
    ];

    let report = parser().extract(&lines);

    assert_eq!(report.report_dates, "");
    assert!(!report.has_report_dates());
    // Rows are still extracted; the caller decides to stop
    assert_eq!(report.rows.len(), 1);
}

#[test]
fn test_boilerplate_between_rows_is_skipped() {
    let lines = [
        "Weekly Trout Stocking Report: 3/2/2026 - 3/6/2026",
        "DATE COUNTY WATERBODY",
        "3/2/2026 Union Nottely Tailwater",
        "GEORGIA DEPARTMENT OF NATURAL RESOURCES",
        "Wildlife Resources Division   Fisheries Section",
        "",
        "3/3/2026 Towns Hiwassee River",
    ];

    let report = parser().extract(&lines);

    assert_eq!(
        report.rows,
        vec![
            StockingRow::new("03/02/2026", "Union", "Nottely Tailwater"),
            StockingRow::new("03/03/2026", "Towns", "Hiwassee River"),
        ]
    );
}

#[test]
fn test_fallback_split_single_spaces() {
    let row = parser()
        .parse_row("12/15/2025 Forsyth Lanier Tailwater")
        .unwrap();

    assert_eq!(row.county, "Forsyth");
    assert_eq!(row.waterbody, "Lanier Tailwater");
}

#[test]
fn test_layout_gaps_collapse_before_the_split() {
    let lines = [
        "Weekly Trout Stocking Report: 3/2/2026 - 3/6/2026",
        "DATE        COUNTY          WATERBODY",
        "3/4/2026    Jeff Davis      Ocmulgee River",
        "3/4/2026    Rabun Tallulah  River",
    ];

    let report = parser().extract(&lines);

    // Whitespace is normalized first, so the county is always the first word
    assert_eq!(
        report.rows,
        vec![
            StockingRow::new("03/04/2026", "Jeff", "Davis Ocmulgee River"),
            StockingRow::new("03/04/2026", "Rabun", "Tallulah River"),
        ]
    );
}

#[test]
fn test_invalid_dates_drop_the_line() {
    let lines = [
        "DATE COUNTY WATERBODY",
        "2/29/2026 Lumpkin Chestatee River",
        "2/28/2026 Lumpkin Chestatee River",
    ];

    let rows = parser().rows(&lines);

    assert_eq!(rows, vec![StockingRow::new("02/28/2026", "Lumpkin", "Chestatee River")]);
}

#[test]
fn test_empty_document() {
    let lines: [&str; 0] = [];
    let report = parser().extract(&lines);

    assert_eq!(report.report_dates, "");
    assert!(report.rows.is_empty());
}

#[test]
fn test_extraction_is_deterministic() {
    let lines = [
        "Weekly Trout Stocking Report: 12/15/2025 - 12/19/2025",
        "DATE COUNTY WATERBODY",
        "12/15/2025 Forsyth/Gwinnett Lanier Tailwater",
    ];

    let p = parser();
    assert_eq!(p.extract(&lines), p.extract(&lines));
}

#[test]
fn test_text_layer_of_fixture_report() {
    let lines = pdf_text_lines(WEEKLY_REPORT_PDF).unwrap();
    let lines: Vec<&str> = lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()).collect();

    assert_eq!(
        lines,
        vec![
            "GEORGIA DEPARTMENT OF NATURAL RESOURCES",
            "Weekly Trout Stocking Report: 12/15/2025 - 12/19/2025",
            "DATE COUNTY WATERBODY",
            "12/15/2025 Forsyth Lanier Tailwater",
            "12/16/2025 Hall Chattahoochee",
        ]
    );
}

#[tokio::test]
async fn test_pdf_extractor_reads_fixture_report() {
    let extractor = PdfReportExtractor::new().unwrap();

    let report = extractor
        .extract(WEEKLY_REPORT_PDF, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.report_dates, "12/15/2025 - 12/19/2025");
    assert_eq!(
        report.rows,
        vec![
            StockingRow::new("12/15/2025", "Forsyth", "Lanier Tailwater"),
            StockingRow::new("12/16/2025", "Hall", "Chattahoochee"),
        ]
    );
}
