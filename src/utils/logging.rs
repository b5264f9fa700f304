//! Structured logging and credential-redaction utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing a helper that keeps the
//! Gemini API key out of log lines (reqwest errors echo the full request URL,
//! key parameter included).
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{LabelError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    result.map_err(|e| LabelError::Config(format!("failed to initialize logging: {}", e)))
}

static KEY_PARAM_REGEX: OnceLock<Regex> = OnceLock::new();
static GOOGLE_KEY_REGEX: OnceLock<Regex> = OnceLock::new();

/// Sanitizes credentials from log messages.
///
/// Replaces the value of any `key=` query parameter and any bare Google API
/// key (`AIza` followed by 35 URL-safe characters) with a placeholder.
pub fn sanitize(input: &str) -> String {
    let key_param = KEY_PARAM_REGEX
        .get_or_init(|| Regex::new(r"([?&]key=)[^&\s\)]+").expect("Invalid regex pattern"));
    let google_key = GOOGLE_KEY_REGEX
        .get_or_init(|| Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("Invalid regex pattern"));

    let result = key_param.replace_all(input, "${1}[REDACTED]");
    google_key
        .replace_all(&result, "[REDACTED_API_KEY]")
        .into_owned()
}
