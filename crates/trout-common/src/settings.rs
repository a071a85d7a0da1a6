//! Required settings
//!
//! The loader cannot start without its report URL and store connection
//! string. Both arrive as optional strings from the environment or the command
//! line and are checked here.

use crate::error::{Result, TroutError};

/// Return the trimmed value of a required setting.
///
/// Missing and whitespace-only values are configuration errors naming the
/// setting.
pub fn require_setting(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(TroutError::config(format!("{} is set but empty", name))),
        None => Err(TroutError::config(format!("{} is not set", name))),
    }
}

/// Read an environment variable, treating non-unicode values as unset.
pub fn env_setting(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
