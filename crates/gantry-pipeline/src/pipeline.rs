//! Pipeline construction and dispatch.
//!
//! The [`PipelineBuilder`] accumulates steps in the order the application
//! registers them; [`PipelineBuilder::build`] resolves every step source
//! against the container, adapts guards, interceptors, and error handlers
//! into the uniform middleware signature, and indexes endpoints into the
//! router. The resulting [`Pipeline`] is immutable and shared across all
//! requests.
//!
//! ## Ordering
//!
//! Registration order is the execution order. For a matched endpoint, the
//! chain consists of every middleware-kind step registered before it, in
//! sequence; steps registered after the endpoint never run for it. No
//! category is reordered relative to another.
//!
//! ## Short-circuiting
//!
//! A guard denial answers immediately with a problem response. A step
//! error unwinds to the nearest error handler registered upstream; with
//! none, [`Pipeline::dispatch`] returns the error to its caller.

use crate::endpoint::{Endpoint, EndpointSource};
use crate::error_handler::{ErrorHandler, ErrorHandlerSource};
use crate::guard::{Guard, GuardSource, Verdict};
use crate::interceptor::{Interceptor, InterceptorSource};
use crate::middleware::{Middleware, MiddlewareSource, Next};
use crate::step::ResolveError;
use crate::types::{BoxFuture, Response, ResponseExt, StepResult};
use gantry_core::di::Container;
use gantry_core::{Problem, RequestContext};
use gantry_router::{RouteError, RouteMatch, Router};
use http::Method;
use std::sync::Arc;
use thiserror::Error;

/// Where a matched route lands: which endpoint, and how much of the chain
/// runs before it.
#[derive(Debug, Clone, Copy)]
struct RouteTarget {
    /// Index into the endpoint table.
    endpoint: usize,
    /// Number of chain steps registered before this endpoint.
    upstream: usize,
}

/// Errors raised while building a pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A step source could not be resolved.
    #[error("failed to resolve {kind} step: {source}")]
    Resolve {
        /// The step category being resolved.
        kind: &'static str,
        /// The underlying resolution failure.
        #[source]
        source: ResolveError,
    },
    /// An endpoint registration conflicted with an earlier route.
    #[error(transparent)]
    Route(#[from] RouteError),
}

impl BuildError {
    fn resolve(kind: &'static str, source: ResolveError) -> Self {
        Self::Resolve { kind, source }
    }
}

/// An immutable, shareable request pipeline.
///
/// Built once at startup, then driven by the server (or the test client)
/// for every request. The pipeline holds no per-request state; all of that
/// lives in the [`RequestContext`] owned by each request.
pub struct Pipeline {
    chain: Vec<Arc<dyn Middleware>>,
    endpoints: Vec<Arc<dyn Endpoint>>,
    router: Router<RouteTarget>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("chain", &self.chain.len())
            .field("endpoints", &self.endpoints.len())
            .field("router", &self.router)
            .finish()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs one request through the pipeline.
    ///
    /// Routes the context's method and path, composes the chain of steps
    /// registered before the matched endpoint, and runs it to completion.
    /// An unmatched route answers 404 without running any step.
    ///
    /// # Errors
    ///
    /// Returns the error of a failing step when no error handler upstream
    /// of it was registered. The caller decides what that means on the
    /// wire; the bundled server answers with a 500 problem response.
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> StepResult {
        let Some(RouteMatch { value, params }) =
            self.router.match_route(ctx.method(), ctx.path())
        else {
            tracing::debug!(method = %ctx.method(), path = %ctx.path(), "no route matched");
            let problem = Problem::not_found().with_instance(ctx.path().to_string());
            ctx.mark_responded();
            return Ok(Response::problem(&problem));
        };
        let target = *value;
        ctx.set_params(params);

        let endpoint = self.endpoints[target.endpoint].as_ref();
        let mut next = Next::endpoint(endpoint);
        for middleware in self.chain[..target.upstream].iter().rev() {
            next = Next::chain(middleware.as_ref(), next);
        }

        let result = next.run(ctx).await;
        if result.is_ok() {
            ctx.mark_responded();
        }
        result
    }

    /// Returns the number of registered route patterns.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// Returns the number of chain steps (endpoints not included).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.chain.len()
    }
}

impl Default for Pipeline {
    /// An empty pipeline: every request answers 404.
    fn default() -> Self {
        Self {
            chain: Vec::new(),
            endpoints: Vec::new(),
            router: Router::new(),
        }
    }
}

/// Builder accumulating steps in registration order.
///
/// # Example
///
/// ```rust
/// use gantry_core::di::Container;
/// use gantry_pipeline::{endpoint, guard, Pipeline};
/// use http::Method;
///
/// let pipeline = Pipeline::builder()
///     .add_guard(guard::from_fn(|ctx| ctx.principal().is_authenticated()))
///     .add_endpoint(Method::GET, "/whoami", endpoint::from_fn(|_| "you"))
///     .build(&Container::new())
///     .unwrap();
///
/// assert_eq!(pipeline.route_count(), 1);
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Middleware(MiddlewareSource),
    Guard(GuardSource),
    Interceptor(InterceptorSource),
    ErrorHandler(ErrorHandlerSource),
    Endpoint {
        method: Method,
        path: String,
        source: EndpointSource,
    },
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware step.
    #[must_use]
    pub fn add_middleware(mut self, source: impl Into<MiddlewareSource>) -> Self {
        self.entries.push(Entry::Middleware(source.into()));
        self
    }

    /// Appends a guard step.
    ///
    /// At request time the guard runs in sequence like any other step; a
    /// denial short-circuits with a 401/403 problem response.
    #[must_use]
    pub fn add_guard(mut self, source: impl Into<GuardSource>) -> Self {
        self.entries.push(Entry::Guard(source.into()));
        self
    }

    /// Appends an interceptor step.
    #[must_use]
    pub fn add_interceptor(mut self, source: impl Into<InterceptorSource>) -> Self {
        self.entries.push(Entry::Interceptor(source.into()));
        self
    }

    /// Appends an error-handler step covering everything registered after
    /// it.
    #[must_use]
    pub fn add_error_handler(mut self, source: impl Into<ErrorHandlerSource>) -> Self {
        self.entries.push(Entry::ErrorHandler(source.into()));
        self
    }

    /// Registers an endpoint for a method and path pattern.
    ///
    /// Only the steps registered before this call run for requests it
    /// matches.
    #[must_use]
    pub fn add_endpoint(
        mut self,
        method: Method,
        path: impl Into<String>,
        source: impl Into<EndpointSource>,
    ) -> Self {
        self.entries.push(Entry::Endpoint {
            method,
            path: path.into(),
            source: source.into(),
        });
        self
    }

    /// Resolves every step and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when a step source fails to resolve or an
    /// endpoint registration conflicts with an earlier route. Both are
    /// programmer errors surfaced before the first request.
    pub fn build(self, container: &Container) -> Result<Pipeline, BuildError> {
        let mut chain: Vec<Arc<dyn Middleware>> = Vec::new();
        let mut endpoints: Vec<Arc<dyn Endpoint>> = Vec::new();
        let mut router = Router::new();

        for entry in self.entries {
            match entry {
                Entry::Middleware(source) => {
                    let step = source
                        .resolve(container)
                        .map_err(|e| BuildError::resolve("middleware", e))?;
                    chain.push(step);
                }
                Entry::Guard(source) => {
                    let guard = source
                        .resolve(container)
                        .map_err(|e| BuildError::resolve("guard", e))?;
                    chain.push(Arc::new(GuardStep { guard }));
                }
                Entry::Interceptor(source) => {
                    let interceptor = source
                        .resolve(container)
                        .map_err(|e| BuildError::resolve("interceptor", e))?;
                    chain.push(Arc::new(InterceptorStep { interceptor }));
                }
                Entry::ErrorHandler(source) => {
                    let handler = source
                        .resolve(container)
                        .map_err(|e| BuildError::resolve("error handler", e))?;
                    chain.push(Arc::new(CatchStep { handler }));
                }
                Entry::Endpoint {
                    method,
                    path,
                    source,
                } => {
                    let endpoint = source
                        .resolve(container)
                        .map_err(|e| BuildError::resolve("endpoint", e))?;
                    let target = RouteTarget {
                        endpoint: endpoints.len(),
                        upstream: chain.len(),
                    };
                    endpoints.push(endpoint);
                    router.route(method, &path, target)?;
                }
            }
        }

        Ok(Pipeline {
            chain,
            endpoints,
            router,
        })
    }
}

/// Adapts a guard into the chain signature.
struct GuardStep {
    guard: Arc<dyn Guard>,
}

impl Middleware for GuardStep {
    fn name(&self) -> &'static str {
        self.guard.name()
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            match self.guard.check(ctx).await? {
                Verdict::Allow => next.run(ctx).await,
                Verdict::Deny(denial) => {
                    tracing::debug!(
                        guard = self.guard.name(),
                        status = denial.status().as_u16(),
                        "guard denied request"
                    );
                    let problem = Problem::from_status(denial.status())
                        .with_instance(ctx.path().to_string());
                    Ok(Response::problem(&problem))
                }
            }
        })
    }
}

/// Adapts an interceptor into the chain signature: run the side effect,
/// continue unconditionally.
struct InterceptorStep {
    interceptor: Arc<dyn Interceptor>,
}

impl Middleware for InterceptorStep {
    fn name(&self) -> &'static str {
        self.interceptor.name()
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            self.interceptor.intercept(ctx).await?;
            next.run(ctx).await
        })
    }
}

/// Adapts an error handler into the chain signature: await downstream,
/// catch an error exactly once, never rethrow.
struct CatchStep {
    handler: Arc<dyn ErrorHandler>,
}

impl Middleware for CatchStep {
    fn name(&self) -> &'static str {
        self.handler.name()
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            match next.run(ctx).await {
                Ok(response) => Ok(response),
                Err(error) => {
                    tracing::debug!(
                        handler = self.handler.name(),
                        error = %error,
                        "error handler caught step failure"
                    );
                    Ok(self.handler.handle(ctx, error).await)
                }
            }
        })
    }
}
