//! Structured logging for Gantry services.
//!
//! Log output goes through the `tracing` ecosystem: JSON lines for
//! production, human-readable output for development, with levels
//! controlled by an env-filter directive.
//!
//! # Example
//!
//! ```rust,ignore
//! use gantry_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(route = "/users", "request accepted");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Level directive (e.g. "info", "debug", "gantry_server=trace").
    pub level: String,

    /// Whether to emit JSON lines instead of human-readable output.
    pub json_format: bool,

    /// Whether to include span open/close events.
    pub span_events: bool,

    /// Whether to include file and line info.
    pub file_line_info: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Human-readable output at debug level, for local development.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// JSON output at info level, for production.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Initializes the global logging subscriber.
///
/// Call once at startup, before the server starts accepting requests.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] when the level directive does
/// not parse or a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_json_info() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn development_is_pretty_debug() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert_eq!(config.level, "debug");
        assert!(config.span_events);
    }

    #[test]
    fn disabled_config_initializes_nothing() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn invalid_level_is_rejected() {
        let config = LogConfig {
            level: "not a level !!!".to_string(),
            ..LogConfig::default()
        };
        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }
}
