//! Structured logging setup
//!
//! The library only emits `tracing` events; hosts that have no subscriber of
//! their own can install one here. Settings come from the environment:
//!
//! - `MULTIDUMP_LOG_LEVEL` - trace/debug/info/warn/error (default `info`)
//! - `MULTIDUMP_LOG_FORMAT` - `json` or `pretty` (default `pretty`)
//! - `MULTIDUMP_LOG_ASYNC` - buffer output on a background writer (default `false`)
//! - `MULTIDUMP_LOG_TARGET_FILTER` - extra comma-separated `EnvFilter` directives
//! - `MULTIDUMP_LOG_INCLUDE_LOCATION` - include `file:line` (default `false`)
//!
//! `RUST_LOG`, when set, takes precedence over `MULTIDUMP_LOG_LEVEL`.

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for log shippers, pretty-print for a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a `tracing-appender` non-blocking writer
    pub async_logging: bool,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("MULTIDUMP_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("MULTIDUMP_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: lookup("MULTIDUMP_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: lookup("MULTIDUMP_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("MULTIDUMP_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',') {
                let filter = filter.trim();
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {}", filter),
                }
            }
        }
        env_filter
    }
}

/// Keeps the background writer alive; drop it to flush buffered logs.
#[must_use = "dropping the guard stops the background log writer"]
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: Option<WorkerGuard>,
}

/// Install a global subscriber built from `config`.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard> {
    let (writer, worker) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking),
            Some(guard),
        )
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LoggingGuard { _worker: worker })
}

/// [`init_logging_with_config`] with settings from the environment.
pub fn init_logging() -> Result<LoggingGuard> {
    init_logging_with_config(&LogConfig::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(!config.async_logging);
        assert!(config.target_filter.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MULTIDUMP_LOG_LEVEL", "debug"),
            ("MULTIDUMP_LOG_FORMAT", "json"),
            ("MULTIDUMP_LOG_ASYNC", "true"),
            ("MULTIDUMP_LOG_TARGET_FILTER", "multidump::render=trace"),
            ("MULTIDUMP_LOG_INCLUDE_LOCATION", "yes"),
        ]
        .into_iter()
        .collect();
        let config = LogConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.async_logging);
        assert_eq!(config.target_filter.as_deref(), Some("multidump::render=trace"));
        // unparseable booleans fall back to the default
        assert!(!config.include_location);
    }
}
