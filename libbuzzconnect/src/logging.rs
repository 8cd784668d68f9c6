//! Shared logging setup for the BuzzConnect command-line tools
//!
//! All output goes to stderr so stdout stays clean for post ids and JSON.
//! Format and level come from `BUZZ_LOG_FORMAT` / `BUZZ_LOG_LEVEL`, with
//! `RUST_LOG` taking precedence when set.
//!
//! ```no_run
//! use libbuzzconnect::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Json, "debug").init();
//! ```

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// HTTP internals are chatty at debug level; keep them at warn unless asked for
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Plain single-line records
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line, coloured
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                other
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: impl Into<String>) -> Self {
        Self {
            format,
            level: level.into(),
        }
    }

    /// Build from `BUZZ_LOG_FORMAT` and `BUZZ_LOG_LEVEL`.
    ///
    /// `verbose` raises the level to debug; an unparseable format falls back to text.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("BUZZ_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let level = if verbose {
            "debug".to_string()
        } else {
            std::env::var("BUZZ_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
        };

        Self { format, level }
    }

    /// Directive string handed to the env filter
    pub fn directives(&self) -> String {
        format!("{},{}", self.level, QUIET_DEPENDENCIES)
    }

    /// Install the global subscriber.
    ///
    /// Returns false if a subscriber was already installed (tests call this repeatedly).
    pub fn init(&self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directives()));

        let installed = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };

        installed.is_ok()
    }
}

/// Initialise logging for a binary from the environment
pub fn init_from_env(verbose: bool) {
    LoggingConfig::from_env(verbose).init();
}
