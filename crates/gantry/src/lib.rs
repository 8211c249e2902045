//! # Gantry
//!
//! **A composable request-pipeline framework for Rust services**
//!
//! Gantry assembles HTTP request handling from explicitly ordered steps:
//!
//! - **Middlewares** see the context and the rest of the chain
//! - **Guards** allow or deny continuation (401/403 problem responses)
//! - **Interceptors** run for their side effect and always continue
//! - **Error handlers** catch downstream failures exactly once
//! - **Endpoints** terminate the chain for a method and path
//!
//! Every step is registered in one of four explicit shapes — function,
//! instance, factory, or DI-service reference — and resolved once when
//! the pipeline is built, so configuration mistakes fail at startup.
//!
//! ```text
//! Request → step 1 → step 2 → ... → endpoint
//!                                      ↓
//! Response ←───────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gantry::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::builder()
//!         .add_endpoint(Method::GET, "/hello/{name}", endpoint::from_fn(|ctx| {
//!             format!("hello, {}", ctx.param("name").unwrap_or("stranger"))
//!         }))
//!         .build(&Container::new())?;
//!
//!     Server::builder()
//!         .http_addr("0.0.0.0:8080")
//!         .pipeline(Arc::new(pipeline))
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/gantry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use gantry_core as core;

// Re-export the router
pub use gantry_router as router;

// Re-export the pipeline
pub use gantry_pipeline as pipeline;

// Re-export the server
pub use gantry_server as server;

// Re-export telemetry
pub use gantry_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use gantry::prelude::*;
/// ```
pub mod prelude {
    pub use gantry_core::{
        ErrorCategory, GantryError, GantryResult, Principal, Problem, RequestContext, RequestId,
    };

    // Re-export DI types
    pub use gantry_core::di::{Container, Inject};

    // Re-export pipeline types and step constructors
    pub use gantry_pipeline::{
        endpoint, error_handler, guard, interceptor, middleware, BoxFuture, Denial, Endpoint,
        ErrorHandler, Guard, Interceptor, Middleware, Next, Payload, Pipeline, PipelineBuilder,
        Reply, Response, ResponseExt, StepKind, StepResult, StepSource, Verdict,
    };

    // Re-export server types
    pub use gantry_server::{Server, ServerConfig, ShutdownSignal};

    // Re-export logging setup
    pub use gantry_telemetry::{init_logging, LogConfig};

    // The HTTP vocabulary used when registering endpoints
    pub use http::{Method, StatusCode};
}
