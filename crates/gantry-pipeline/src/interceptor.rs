//! Interceptors: steps that run for their side effect.
//!
//! An interceptor mutates the request context (attaching an identity,
//! stashing an extension, stamping a claim) and the chain continues
//! unconditionally afterwards. Unlike a guard it cannot short-circuit with
//! a response; unlike a middleware it never sees the response. An `Err`
//! from an interceptor propagates like any step failure.

use crate::step::{ServiceLookup, StepSource};
use crate::types::BoxFuture;
use gantry_core::{GantryResult, RequestContext};
use std::sync::Arc;

/// A step source holding an interceptor.
pub type InterceptorSource = StepSource<dyn Interceptor>;

/// A step run for its side effect on the request context.
///
/// # Example
///
/// ```rust
/// use gantry_core::{GantryResult, RequestContext};
/// use gantry_pipeline::{BoxFuture, Interceptor};
///
/// struct TrustEveryone;
///
/// impl Interceptor for TrustEveryone {
///     fn name(&self) -> &'static str {
///         "trust_everyone"
///     }
///
///     fn intercept<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<()>> {
///         Box::pin(async move {
///             ctx.principal_mut().authenticate();
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// The name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "interceptor"
    }

    /// Runs the side effect. The chain continues regardless of what this
    /// does to the context.
    fn intercept<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<()>>;
}

/// An interceptor defined by a synchronous closure.
pub struct FnInterceptor<F> {
    name: &'static str,
    func: F,
}

impl<F> FnInterceptor<F> {
    /// Creates a named closure interceptor.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn intercept<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<()>> {
        Box::pin(async move {
            (self.func)(ctx);
            Ok(())
        })
    }
}

/// Registers a closure as an interceptor step (the plain-function shape).
pub fn from_fn<F>(func: F) -> InterceptorSource
where
    F: Fn(&mut RequestContext) + Send + Sync + 'static,
{
    let step: Arc<dyn Interceptor> = Arc::new(FnInterceptor::new("fn_interceptor", func));
    StepSource::Func(step)
}

/// Registers a ready interceptor object (the instance shape).
pub fn instance<I: Interceptor>(interceptor: I) -> InterceptorSource {
    let step: Arc<dyn Interceptor> = Arc::new(interceptor);
    StepSource::Instance(step)
}

/// References an interceptor registered in the DI container (the service
/// shape).
#[must_use]
pub fn service<I: Interceptor>() -> InterceptorSource {
    StepSource::Service(ServiceLookup::of::<I>(|i| i as Arc<dyn Interceptor>))
}

impl<I: Interceptor> From<Arc<I>> for InterceptorSource {
    fn from(interceptor: Arc<I>) -> Self {
        StepSource::Instance(interceptor as Arc<dyn Interceptor>)
    }
}
