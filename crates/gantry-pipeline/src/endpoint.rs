//! Endpoints: the terminal step of a chain.
//!
//! An endpoint produces the [`Reply`] for a matched route. It runs only
//! when the request's method and path match its registration and every
//! step registered before it let the chain continue.

use crate::reply::Reply;
use crate::step::{ServiceLookup, StepSource};
use crate::types::BoxFuture;
use gantry_core::{GantryResult, RequestContext};
use std::sync::Arc;

/// A step source holding an endpoint.
pub type EndpointSource = StepSource<dyn Endpoint>;

/// The terminal step producing a response descriptor.
///
/// # Example
///
/// ```rust
/// use gantry_core::{GantryResult, RequestContext};
/// use gantry_pipeline::{BoxFuture, Endpoint, Reply};
///
/// struct WhoAmI;
///
/// impl Endpoint for WhoAmI {
///     fn name(&self) -> &'static str {
///         "who_am_i"
///     }
///
///     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<Reply>> {
///         Box::pin(async move {
///             Reply::json(&serde_json::json!({
///                 "authenticated": ctx.principal().is_authenticated(),
///             }))
///         })
///     }
/// }
/// ```
pub trait Endpoint: Send + Sync + 'static {
    /// The name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "endpoint"
    }

    /// Produces the reply for this request.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<Reply>>;
}

/// An endpoint defined by a synchronous closure.
pub struct FnEndpoint<F> {
    name: &'static str,
    func: F,
}

impl<F> FnEndpoint<F> {
    /// Creates a named closure endpoint.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Endpoint for FnEndpoint<F>
where
    F: Fn(&mut RequestContext) -> GantryResult<Reply> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, GantryResult<Reply>> {
        Box::pin(async move { (self.func)(ctx) })
    }
}

/// Registers an infallible closure as an endpoint (the plain-function
/// shape).
///
/// The closure may return anything convertible into a [`Reply`]: a reply,
/// a string, a `serde_json::Value`, a status code, or `()` for an empty
/// 200.
pub fn from_fn<F, R>(func: F) -> EndpointSource
where
    F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
    R: Into<Reply>,
{
    let adapted = move |ctx: &mut RequestContext| Ok(func(ctx).into());
    let step: Arc<dyn Endpoint> = Arc::new(FnEndpoint::new("fn_endpoint", adapted));
    StepSource::Func(step)
}

/// Registers a fallible closure as an endpoint (the plain-function shape).
pub fn from_try_fn<F>(func: F) -> EndpointSource
where
    F: Fn(&mut RequestContext) -> GantryResult<Reply> + Send + Sync + 'static,
{
    let step: Arc<dyn Endpoint> = Arc::new(FnEndpoint::new("fn_endpoint", func));
    StepSource::Func(step)
}

/// Registers a ready endpoint object (the instance shape).
pub fn instance<E: Endpoint>(endpoint: E) -> EndpointSource {
    let step: Arc<dyn Endpoint> = Arc::new(endpoint);
    StepSource::Instance(step)
}

/// References an endpoint registered in the DI container (the service
/// shape).
#[must_use]
pub fn service<E: Endpoint>() -> EndpointSource {
    StepSource::Service(ServiceLookup::of::<E>(|e| e as Arc<dyn Endpoint>))
}

impl<E: Endpoint> From<Arc<E>> for EndpointSource {
    fn from(endpoint: Arc<E>) -> Self {
        StepSource::Instance(endpoint as Arc<dyn Endpoint>)
    }
}
