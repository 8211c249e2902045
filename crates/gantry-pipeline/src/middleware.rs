//! The middleware trait and chain.
//!
//! Middleware is the uniform signature every step is adapted into: it
//! receives the mutable [`RequestContext`] and a [`Next`] handle to the
//! remainder of the chain. Guards, interceptors, and error handlers are
//! wrapped into this shape by the builder; endpoints terminate the chain.

use crate::endpoint::Endpoint;
use crate::step::StepSource;
use crate::types::{BoxFuture, StepResult};
use gantry_core::RequestContext;
use std::sync::Arc;

/// A step source holding a middleware.
pub type MiddlewareSource = StepSource<dyn Middleware>;

/// One unit of request processing with access to the rest of the chain.
///
/// # Invariants
///
/// - A middleware calls `next.run` at most once; not calling it
///   short-circuits the chain with this middleware's own result.
/// - Errors from downstream are propagated, not swallowed; only error
///   handlers consume them.
///
/// # Example
///
/// ```rust
/// use gantry_core::RequestContext;
/// use gantry_pipeline::{BoxFuture, Middleware, Next, StepResult};
///
/// struct Timing;
///
/// impl Middleware for Timing {
///     fn name(&self) -> &'static str {
///         "timing"
///     }
///
///     fn handle<'a>(
///         &'a self,
///         ctx: &'a mut RequestContext,
///         next: Next<'a>,
///     ) -> BoxFuture<'a, StepResult> {
///         Box::pin(async move {
///             let result = next.run(ctx).await;
///             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
///             result
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// The name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "middleware"
    }

    /// Processes the request, deciding whether and when to continue the
    /// chain via `next`.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult>;
}

/// A handle to the remainder of the chain.
///
/// Consuming `run` guarantees the remainder executes at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware before the endpoint.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain: the matched endpoint.
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Prepends a middleware onto an existing chain.
    pub(crate) fn chain(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal segment invoking the endpoint.
    pub(crate) fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Invokes the next segment of the chain.
    pub async fn run(self, ctx: &mut RequestContext) -> StepResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.handle(ctx, *next).await,
            NextInner::Endpoint(endpoint) => {
                let reply = endpoint.call(ctx).await?;
                reply.into_response().await
            }
        }
    }
}

/// A middleware defined by a closure.
///
/// The closure receives the context and the `Next` handle, exactly like a
/// trait implementation, and returns a boxed future.
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a named closure middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, StepResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, StepResult> {
        (self.func)(ctx, next)
    }
}

/// Registers a closure as a middleware step (the plain-function shape).
pub fn from_fn<F>(func: F) -> MiddlewareSource
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, StepResult>
        + Send
        + Sync
        + 'static,
{
    let step: Arc<dyn Middleware> = Arc::new(FnMiddleware::new("fn_middleware", func));
    StepSource::Func(step)
}

/// Registers a ready middleware object (the instance shape).
pub fn instance<M: Middleware>(middleware: M) -> MiddlewareSource {
    let step: Arc<dyn Middleware> = Arc::new(middleware);
    StepSource::Instance(step)
}

/// References a middleware registered in the DI container (the service
/// shape); looked up when the pipeline is built.
#[must_use]
pub fn service<M: Middleware>() -> MiddlewareSource {
    StepSource::Service(crate::step::ServiceLookup::of::<M>(|m| m as Arc<dyn Middleware>))
}

impl<M: Middleware> From<Arc<M>> for MiddlewareSource {
    fn from(middleware: Arc<M>) -> Self {
        StepSource::Instance(middleware as Arc<dyn Middleware>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FnEndpoint;
    use crate::types::{Response, ResponseExt};
    use crate::Reply;
    use http::StatusCode;

    fn ok_endpoint() -> FnEndpoint<impl Fn(&mut RequestContext) -> gantry_core::GantryResult<Reply>>
    {
        FnEndpoint::new("ok", |_: &mut RequestContext| Ok(Reply::text("OK")))
    }

    #[tokio::test]
    async fn terminal_next_invokes_endpoint() {
        let endpoint = ok_endpoint();
        let mut ctx = RequestContext::mock();

        let response = Next::endpoint(&endpoint).run(&mut ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn chain_runs_middleware_then_endpoint() {
        struct Tag;
        impl Middleware for Tag {
            fn name(&self) -> &'static str {
                "tag"
            }

            fn handle<'a>(
                &'a self,
                ctx: &'a mut RequestContext,
                next: Next<'a>,
            ) -> BoxFuture<'a, StepResult> {
                Box::pin(async move {
                    ctx.set_extension("tagged");
                    next.run(ctx).await
                })
            }
        }

        let endpoint = ok_endpoint();
        let tag = Tag;
        let mut ctx = RequestContext::mock();

        let next = Next::chain(&tag, Next::endpoint(&endpoint));
        let response = next.run(&mut ctx).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.get_extension::<&str>(), Some(&"tagged"));
    }

    #[tokio::test]
    async fn fn_middleware_short_circuits_without_calling_next() {
        let source = from_fn(|_ctx, _next| {
            Box::pin(async move { Ok(Response::empty(StatusCode::IM_A_TEAPOT)) })
        });

        let container = gantry_core::di::Container::new();
        let middleware = source.resolve(&container).unwrap();

        let endpoint = ok_endpoint();
        let mut ctx = RequestContext::mock();
        let response = middleware
            .handle(&mut ctx, Next::endpoint(&endpoint))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn source_shapes() {
        use crate::step::StepKind;

        let func = from_fn(|ctx, next| Box::pin(async move { next.run(ctx).await }));
        assert_eq!(func.kind(), StepKind::Func);

        struct Noop;
        impl Middleware for Noop {
            fn handle<'a>(
                &'a self,
                ctx: &'a mut RequestContext,
                next: Next<'a>,
            ) -> BoxFuture<'a, StepResult> {
                Box::pin(next.run(ctx))
            }
        }

        assert_eq!(instance(Noop).kind(), StepKind::Instance);
        assert_eq!(service::<Noop>().kind(), StepKind::Service);
        assert_eq!(
            MiddlewareSource::from(Arc::new(Noop)).kind(),
            StepKind::Instance
        );
    }
}
