//! Telemetry error types.

use thiserror::Error;

/// Result type alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Errors raised while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Logging initialization failed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
