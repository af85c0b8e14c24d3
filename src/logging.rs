//! # Structured Logging Module
//!
//! Environment-aware console logging using the tracing ecosystem. Logs go to
//! stdout so the container runtime can collect them; nothing is written to
//! local files.
//!
//! ## Environment variables
//!
//! - `LOG_LEVEL` / `RUST_LOG`: filter directives (first one set wins)
//! - `CLAIMS_API_ENV`: `production` defaults to `info`, anything else to `debug`
//! - `LOG_FORMAT=json`: one JSON object per line instead of human-readable text

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Output encoding for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs a subscriber and
/// an already-installed global subscriber (e.g. from a test harness) is kept.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let format = LogFormat::from_env();
        let use_ansi = std::io::stdout().is_terminal();

        let text_layer = (format == LogFormat::Text).then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(EnvFilter::new(&log_level))
        });

        let json_layer = (format == LogFormat::Json).then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_filter(EnvFilter::new(&log_level))
        });

        let subscriber = tracing_subscriber::registry()
            .with(text_layer)
            .with(json_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                log_level = %log_level,
                format = ?format,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("CLAIMS_API_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment variables or environment defaults
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    default_level_for(environment).to_string()
}

fn default_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}
