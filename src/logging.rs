//! Structured logging setup.
//!
//! Library code only emits `tracing` events; binaries call
//! [`init_logging_with_config`] once at startup to install a subscriber.
//!
//! | variable                         | meaning                                   | default |
//! |----------------------------------|-------------------------------------------|---------|
//! | `RDISPATCH_LOG_LEVEL`            | trace / debug / info / warn / error       | `info`  |
//! | `RDISPATCH_LOG_FORMAT`           | `json` or `pretty`                        | `json`  |
//! | `RDISPATCH_LOG_ASYNC`            | write through a non-blocking appender     | `false` |
//! | `RDISPATCH_LOG_TARGET_FILTER`    | extra comma-separated filter directives   | none    |
//! | `RDISPATCH_LOG_INCLUDE_LOCATION` | include file and line in each event       | `false` |
//!
//! `RUST_LOG`, when set, replaces the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Write through `tracing_appender::non_blocking`
    pub async_logging: bool,
    /// Module filter (comma-separated directives)
    pub target_filter: Option<String>,
    /// Include file:line location (dev only)
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            get(key)
                .and_then(|s| s.parse().ok())
                .unwrap_or(false)
        };
        Self {
            log_level: get("RDISPATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format: LogFormat::parse(
                &get("RDISPATCH_LOG_FORMAT").unwrap_or_else(|| "json".to_string()),
            ),
            async_logging: flag("RDISPATCH_LOG_ASYNC"),
            target_filter: get("RDISPATCH_LOG_TARGET_FILTER"),
            include_location: flag("RDISPATCH_LOG_INCLUDE_LOCATION"),
        }
    }

    /// Create a default configuration for local development and tests
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Build the filter: `RUST_LOG` if set, else the configured level, plus any target
/// directives. Invalid directives are reported on stderr and skipped.
fn build_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    if let Some(targets) = &config.target_filter {
        for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
            }
        }
    }
    filter
}

fn fmt_layer<S, W>(config: &LogConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
///
/// ```no_run
/// use route_dispatch::logging::{init_logging_with_config, LogConfig};
///
/// init_logging_with_config(&LogConfig::from_env()).expect("logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        registry
            .with(fmt_layer(config, non_blocking))
            .try_init()
            .context("Failed to initialize async logging")?;
        // The guard flushes on drop; keep it for the life of the process.
        std::mem::forget(guard);
    } else {
        registry
            .with(fmt_layer(config, std::io::stdout))
            .try_init()
            .context("Failed to initialize sync logging")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_log_config_defaults_when_unset() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.async_logging);
        assert!(config.target_filter.is_none());
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_reads_variables() {
        let config = LogConfig::from_lookup(lookup(&[
            ("RDISPATCH_LOG_LEVEL", "debug"),
            ("RDISPATCH_LOG_FORMAT", "Pretty"),
            ("RDISPATCH_LOG_ASYNC", "true"),
            ("RDISPATCH_LOG_TARGET_FILTER", "route_dispatch::router=trace"),
            ("RDISPATCH_LOG_INCLUDE_LOCATION", "not-a-bool"),
        ]));
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.async_logging);
        assert_eq!(
            config.target_filter.as_deref(),
            Some("route_dispatch::router=trace")
        );
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_default_dev() {
        let config = LogConfig::default_dev();
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_location);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json);
    }

    #[test]
    fn test_unknown_level_is_info() {
        let mut config = LogConfig::default_dev();
        config.log_level = "loud".to_string();
        assert_eq!(config.level(), Level::INFO);
    }
}
