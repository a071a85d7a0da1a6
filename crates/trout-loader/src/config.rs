//! Loader configuration
//!
//! Two settings are required: the report URL and the store connection string.
//! Everything else has a default.
//!
//! Sources, lowest precedence first: an optional JSON settings file
//! (`appsettings.json` layout), the process environment (plus `.env`), then
//! command-line overrides.

use std::path::{Path, PathBuf};

use crate::error::{LoaderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use trout_common::settings::{env_setting, require_setting};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Environment variable holding the report URL.
pub const PDF_URL_VAR: &str = "TROUT_PDF_URL";

/// Environment variable holding the store connection string.
pub const DATABASE_URL_VAR: &str = "TROUT_DATABASE_URL";

/// Generic connection string variable used when `TROUT_DATABASE_URL` is unset.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable naming the JSON settings file.
pub const SETTINGS_FILE_VAR: &str = "TROUT_SETTINGS_FILE";

/// Settings file read from the working directory when present.
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

/// Environment variable overriding the target table.
pub const TABLE_VAR: &str = "TROUT_TABLE";

/// Environment variable overriding the download User-Agent.
pub const USER_AGENT_VAR: &str = "TROUT_USER_AGENT";

/// Environment variable overriding the download timeout, in seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "TROUT_REQUEST_TIMEOUT";

/// User-Agent sent with the report download.
pub const DEFAULT_USER_AGENT: &str = "GaTroutStockingLoader/1.0";

/// Whole-request timeout for the report download, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Table the stocking rows are written to.
pub const DEFAULT_TABLE: &str = "weekly_trout_stocking";

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub pdf_url: String,
    pub database_url: String,
    pub table: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// Values supplied on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub pdf_url: Option<String>,
    pub database_url: Option<String>,
    /// Settings file to read instead of `TROUT_SETTINGS_FILE` or the default
    pub settings_file: Option<PathBuf>,
}

/// Required settings found in a JSON settings file.
///
/// Reads `PdfUrl` and `ConnectionStrings.Sql`; key names match in any case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsFile {
    pub pdf_url: Option<String>,
    pub database_url: Option<String>,
}

impl SettingsFile {
    /// Parse settings file contents. Missing or empty keys are `None`.
    pub fn parse(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| LoaderError::config(format!("settings file is not valid JSON: {}", e)))?;

        Ok(Self {
            pdf_url: string_field(&root, "PdfUrl"),
            database_url: field(&root, "ConnectionStrings")
                .and_then(|strings| string_field(strings, "Sql")),
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Reading settings file");
        let json = std::fs::read_to_string(path).inspect_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to read settings file");
        })?;
        Self::parse(&json)
    }

    /// Read the explicitly named file, else `TROUT_SETTINGS_FILE`, else
    /// `appsettings.json` when it exists. A named file must exist.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        if let Some(path) = env_setting(SETTINGS_FILE_VAR) {
            return Self::read(Path::new(&path));
        }

        let default = Path::new(DEFAULT_SETTINGS_FILE);
        if default.is_file() {
            Self::read(default)
        } else {
            Ok(Self::default())
        }
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    field(value, key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl LoaderConfig {
    /// Load configuration from the settings file, `.env`, the process
    /// environment and overrides
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();
        let file = SettingsFile::locate(overrides.settings_file.as_deref())?;
        Self::from_sources(overrides, file)
    }

    /// Build configuration from already-read sources without touching `.env`
    pub fn from_sources(overrides: ConfigOverrides, file: SettingsFile) -> Result<Self> {
        let pdf_url = require_setting(
            PDF_URL_VAR,
            overrides
                .pdf_url
                .or_else(|| env_setting(PDF_URL_VAR))
                .or(file.pdf_url),
        )?;

        let database_url = require_setting(
            DATABASE_URL_VAR,
            overrides
                .database_url
                .or_else(|| env_setting(DATABASE_URL_VAR))
                .or_else(|| env_setting(FALLBACK_DATABASE_URL_VAR))
                .or(file.database_url),
        )?;

        let request_timeout_secs = match env_setting(REQUEST_TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                LoaderError::config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    REQUEST_TIMEOUT_VAR, raw
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let config = LoaderConfig {
            pdf_url,
            database_url,
            table: env_setting(TABLE_VAR).unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            user_agent: env_setting(USER_AGENT_VAR)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout_secs,
        };

        config.validate()?;

        Ok(config)
    }

    /// Build configuration from the process environment alone
    pub fn from_env_with(overrides: ConfigOverrides) -> Result<Self> {
        Self::from_sources(overrides, SettingsFile::default())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        require_setting(PDF_URL_VAR, Some(self.pdf_url.clone()))?;
        require_setting(DATABASE_URL_VAR, Some(self.database_url.clone()))?;

        let parsed = url::Url::parse(&self.pdf_url)
            .map_err(|e| LoaderError::config(format!("{} is not a valid URL: {}", PDF_URL_VAR, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoaderError::config(format!(
                "{} must use http or https, got '{}'",
                PDF_URL_VAR,
                parsed.scheme()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(LoaderError::config("Request timeout must be greater than 0"));
        }

        Ok(())
    }
}
