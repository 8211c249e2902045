//! HTTP server implementation.
//!
//! Binds a built [`Pipeline`] to a hyper HTTP/1 server: one task per
//! connection, one [`RequestContext`] per request, an outer timeout around
//! body collection and dispatch, and graceful drain on shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use gantry_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder()
//!         .http_addr("0.0.0.0:8080")
//!         .pipeline(pipeline)
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use gantry_core::{Problem, RequestContext};
use gantry_pipeline::{Pipeline, Response, ResponseExt};

use crate::config::{ServerConfig, ServerConfigBuilder};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Errors raised while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("Failed to bind: {0}")]
    Bind(String),
}

/// The Gantry HTTP server.
///
/// Owns the configuration and a shared pipeline; every accepted request
/// is parsed into a [`RequestContext`] and dispatched through the
/// pipeline.
pub struct Server {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
}

impl Server {
    /// Creates a server from a configuration and a built pipeline.
    #[must_use]
    pub fn new(config: ServerConfig, pipeline: Arc<Pipeline>) -> Self {
        Self { config, pipeline }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the pipeline this server dispatches into.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configured address cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with an external shutdown signal.
    ///
    /// Useful for tests and embedders that control shutdown themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configured address cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr().map_err(|e| {
            ServerError::Bind(format!("Invalid address '{}': {}", self.config.http_addr(), e))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!("Server listening on {}", addr);

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown_clone = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown_clone).await {
                                    tracing::error!("Connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "Waiting up to {:?} for {} connections to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            () = tracker.wait_for_drain() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "Shutdown timeout reached, {} connections still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Serves one connection.
    async fn handle_connection(
        self: &Arc<Self>,
        stream: tokio::net::TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { server.handle_request(req).await }
        });

        let conn = http1::Builder::new().serve_connection(io, service);

        tokio::select! {
            result = conn => result,
            () = shutdown.recv() => {
                tracing::debug!("Connection from {} closed due to shutdown", remote_addr);
                Ok(())
            }
        }
    }

    /// Serves one request: parse, dispatch, map failures to problems.
    async fn handle_request(
        self: &Arc<Self>,
        req: Request<Incoming>,
    ) -> Result<Response, Infallible> {
        let (parts, body) = req.into_parts();
        tracing::debug!("{} {}", parts.method, parts.uri.path());

        let body = match tokio::time::timeout(self.config.request_timeout(), body.collect()).await
        {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::warn!("Failed to read request body: {}", e);
                let problem = Problem::from_status(StatusCode::BAD_REQUEST)
                    .with_detail(format!("failed to read request body: {e}"))
                    .with_instance(parts.uri.path().to_string());
                return Ok(Response::problem(&problem));
            }
            Err(_) => {
                tracing::warn!("Request body collection timed out");
                let problem = Problem::from_status(StatusCode::REQUEST_TIMEOUT)
                    .with_instance(parts.uri.path().to_string());
                return Ok(Response::problem(&problem));
            }
        };

        let mut ctx = RequestContext::from_parts(parts.method, &parts.uri, parts.headers, body);

        let outcome = tokio::time::timeout(
            self.config.request_timeout(),
            self.pipeline.dispatch(&mut ctx),
        )
        .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                // No error handler upstream caught it: the host default is
                // a problem response with the error's status mapping.
                tracing::error!(
                    request_id = %ctx.request_id(),
                    error = %error,
                    "unhandled pipeline error"
                );
                let problem =
                    Problem::from_error(&error).with_instance(ctx.path().to_string());
                Response::problem(&problem)
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    "request timed out"
                );
                let problem = Problem::from_status(StatusCode::GATEWAY_TIMEOUT)
                    .with_instance(ctx.path().to_string());
                Response::problem(&problem)
            }
        };

        ctx.mark_responded();
        tracing::debug!(
            request_id = %ctx.request_id(),
            status = response.status().as_u16(),
            elapsed = ?ctx.elapsed(),
            "request finished"
        );
        Ok(response)
    }
}

/// Builder for configuring and creating a [`Server`].
///
/// # Example
///
/// ```rust
/// use gantry_server::Server;
/// use std::time::Duration;
///
/// let server = Server::builder()
///     .http_addr("0.0.0.0:9090")
///     .shutdown_timeout(Duration::from_secs(60))
///     .build();
///
/// assert_eq!(server.config().http_addr(), "0.0.0.0:9090");
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: ServerConfigBuilder,
    pipeline: Option<Arc<Pipeline>>,
}

impl ServerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pipeline to dispatch requests into.
    #[must_use]
    pub fn pipeline(mut self, pipeline: Arc<Pipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful-shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Builds the server.
    ///
    /// Without a pipeline, the server answers every request with 404.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config_builder.build(),
            pipeline: self
                .pipeline
                .unwrap_or_else(|| Arc::new(Pipeline::default())),
        }
    }
}
