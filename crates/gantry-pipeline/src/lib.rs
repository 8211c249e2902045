//! # Gantry Pipeline
//!
//! The ordered request pipeline at the heart of Gantry.
//!
//! Applications register steps on a [`PipelineBuilder`] — middlewares,
//! guards, interceptors, error handlers, endpoints — and every request
//! runs through the steps registered before its matched endpoint, in
//! registration order:
//!
//! ```text
//! Request → step 1 → step 2 → ... → endpoint
//!                                      ↓
//! Response ←───────────────────────────┘
//! ```
//!
//! Each step is registered as a [`StepSource`]: a plain function, a ready
//! instance, a factory, or a reference to a service in the DI container.
//! The shape is explicit at registration time and resolved once when the
//! pipeline is built, so a misconfigured step fails at startup, not in
//! flight.
//!
//! ## Example
//!
//! ```rust
//! use gantry_core::di::Container;
//! use gantry_pipeline::{endpoint, guard, interceptor, Pipeline};
//! use http::Method;
//!
//! let pipeline = Pipeline::builder()
//!     .add_interceptor(interceptor::from_fn(|ctx| {
//!         ctx.principal_mut().authenticate();
//!     }))
//!     .add_guard(guard::from_fn(|ctx| ctx.principal().is_authenticated()))
//!     .add_endpoint(Method::GET, "/hello", endpoint::from_fn(|_| "hello"))
//!     .build(&Container::new())
//!     .expect("pipeline builds");
//!
//! assert_eq!(pipeline.route_count(), 1);
//! assert_eq!(pipeline.step_count(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/gantry-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod endpoint;
pub mod error_handler;
pub mod guard;
pub mod interceptor;
pub mod middleware;
mod pipeline;
mod reply;
pub mod step;
mod types;

pub use endpoint::{Endpoint, EndpointSource, FnEndpoint};
pub use error_handler::{ErrorHandler, ErrorHandlerSource, FnErrorHandler};
pub use guard::{Denial, FnGuard, Guard, GuardSource, Verdict};
pub use interceptor::{FnInterceptor, Interceptor, InterceptorSource};
pub use middleware::{FnMiddleware, Middleware, MiddlewareSource, Next};
pub use pipeline::{BuildError, Pipeline, PipelineBuilder};
pub use reply::{Payload, Reply};
pub use step::{ResolveError, ServiceLookup, StepFactory, StepKind, StepSource, MAX_FACTORY_DEPTH};
pub use types::{BoxFuture, Response, ResponseExt, StepResult};
