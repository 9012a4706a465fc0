//! Environment configuration helpers
//!
//! Thin typed wrappers over `std::env` used by the market config builder and
//! the server binary.

use std::str::FromStr;

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {key} has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Load a `.env` file from the working directory (or a parent) if present.
///
/// Returns the path that was loaded, `None` when no file was found.
pub fn load_dotenv() -> Option<std::path::PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, ".env present but unreadable");
            None
        }
    }
}

/// Read a variable, treating unset and blank values alike.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a string variable with a default.
pub fn env_str(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// Read and parse a variable. Unset yields `Ok(default)`, garbage yields an error.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env_opt(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

/// Read a boolean flag (`1`, `true`, `yes`, `on`).
pub fn env_bool(key: &str) -> bool {
    env_opt(key).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
