//! Trout Loader - Weekly Trout Stocking Report loader

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use trout_common::logging::{init_logging, LogConfig, LogLevel};
use trout_loader::{
    config::{ConfigOverrides, LoaderConfig},
    extract::PdfReportExtractor,
    fetch::HttpReportFetcher,
    report_json,
    run::{RunCommand, RunOutcome, MISSING_REPORT_DATES_MESSAGE},
    store::SqlStockingWriter,
};

#[derive(Parser, Debug)]
#[command(name = "trout-loader")]
#[command(author, version, about = "Load the Weekly Trout Stocking Report into SQL")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Report PDF URL (overrides TROUT_PDF_URL)
    #[arg(long, global = true)]
    pdf_url: Option<String>,

    /// Store connection string (overrides TROUT_DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// JSON settings file (overrides TROUT_SETTINGS_FILE, default ./appsettings.json)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, Default)]
enum Command {
    /// Download the report and insert new rows (default)
    #[default]
    Run,

    /// Download the report and print the extracted rows as JSON
    Extract,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = run_cli(cli).await;
    process::exit(code);
}

/// Runs the selected command and returns the process exit code.
///
/// Everything that must be flushed (the log guard) is dropped before this
/// returns.
async fn run_cli(cli: Cli) -> i32 {
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(level)
        .log_file_prefix("trout-loader")
        .build();

    // Environment variables take precedence
    let log_config = match log_config.merge_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid logging configuration: {}", e);
            return 1;
        }
    };

    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return 1;
        }
    };

    info!("Application starting");

    let overrides = ConfigOverrides {
        pdf_url: cli.pdf_url,
        database_url: cli.database_url,
        settings_file: cli.settings,
    };

    let config = match LoaderConfig::load(overrides) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration invalid");
            eprintln!("{}", e);
            return 1;
        }
    };

    info!(pdf_url = %config.pdf_url, "Configuration loaded");

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let result = match cli.command.unwrap_or_default() {
        Command::Run => run(&config, &cancel).await,
        Command::Extract => extract(&config, &cancel).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "Application failed");
            eprintln!("{:?}", e);
            1
        }
    }
}

fn build_command(
    config: &LoaderConfig,
) -> anyhow::Result<RunCommand<HttpReportFetcher, PdfReportExtractor, SqlStockingWriter>> {
    Ok(RunCommand::new(
        HttpReportFetcher::from_config(config)?,
        PdfReportExtractor::new()?,
        SqlStockingWriter::from_config(config)?,
    ))
}

async fn run(config: &LoaderConfig, cancel: &CancellationToken) -> anyhow::Result<i32> {
    let command = build_command(config)?;
    let outcome = command.execute(&config.pdf_url, cancel).await?;

    match outcome {
        RunOutcome::Inserted(_) => println!("{}", outcome.message()),
        RunOutcome::ReportDatesMissing => eprintln!("{}", outcome.message()),
    }

    Ok(outcome.exit_code())
}

async fn extract(config: &LoaderConfig, cancel: &CancellationToken) -> anyhow::Result<i32> {
    let command = build_command(config)?;
    let report = command.extract_only(&config.pdf_url, cancel).await?;

    println!("{}", report_json(&report)?);

    if report.has_report_dates() {
        Ok(0)
    } else {
        eprintln!("{}", MISSING_REPORT_DATES_MESSAGE);
        Ok(RunOutcome::ReportDatesMissing.exit_code())
    }
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            cancel.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_run() {
        let cli = Cli::try_parse_from(["trout-loader"]).unwrap();
        assert!(matches!(cli.command.unwrap_or_default(), Command::Run));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_extract_with_overrides() {
        let cli = Cli::try_parse_from([
            "trout-loader",
            "extract",
            "--pdf-url",
            "https://example.test/report.pdf",
            "-v",
            "--settings",
            "conf/appsettings.json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Command::Extract)));
        assert_eq!(cli.settings, Some(PathBuf::from("conf/appsettings.json")));
        assert_eq!(cli.pdf_url.as_deref(), Some("https://example.test/report.pdf"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
