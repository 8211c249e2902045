//! # Gantry Server
//!
//! HTTP server for the Gantry framework, built on hyper and tokio.
//!
//! The server owns nothing but configuration and a shared
//! [`Pipeline`](gantry_pipeline::Pipeline): each accepted request becomes
//! one `RequestContext`, flows through the pipeline on its own task, and
//! is answered with whatever the chain produced. Unhandled pipeline
//! errors and timeouts are mapped to problem-details responses here — the
//! host default the pipeline itself stays out of.

#![doc(html_root_url = "https://docs.rs/gantry-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use server::{Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
