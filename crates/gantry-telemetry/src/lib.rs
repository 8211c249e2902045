//! # Gantry Telemetry
//!
//! Structured logging setup for Gantry services, built on the `tracing`
//! ecosystem. Services call [`logging::init_logging`] once at startup;
//! everything else in the framework just emits `tracing` events and
//! inherits whatever subscriber was installed.

#![doc(html_root_url = "https://docs.rs/gantry-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogConfig};
