//! Error handlers: steps that catch downstream failures.
//!
//! An error handler wraps everything registered after it. When a
//! downstream step returns an error — including one raised inside a
//! suspended async body — the handler receives it exactly once, together
//! with the request context, and answers with a response. It never
//! rethrows: catch once, do not double-handle. Successful responses pass
//! through untouched.

use crate::step::{ServiceLookup, StepSource};
use crate::types::{BoxFuture, Response};
use gantry_core::{GantryError, RequestContext};
use std::sync::Arc;

/// A step source holding an error handler.
pub type ErrorHandlerSource = StepSource<dyn ErrorHandler>;

/// A step turning a downstream error into a response.
///
/// # Example
///
/// ```rust
/// use gantry_core::{GantryError, Problem, RequestContext};
/// use gantry_pipeline::{BoxFuture, ErrorHandler, Response, ResponseExt};
///
/// struct ProblemReporter;
///
/// impl ErrorHandler for ProblemReporter {
///     fn name(&self) -> &'static str {
///         "problem_reporter"
///     }
///
///     fn handle<'a>(
///         &'a self,
///         ctx: &'a mut RequestContext,
///         error: GantryError,
///     ) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let problem = Problem::from_error(&error).with_instance(ctx.path().to_string());
///             Response::problem(&problem)
///         })
///     }
/// }
/// ```
pub trait ErrorHandler: Send + Sync + 'static {
    /// The name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "error_handler"
    }

    /// Converts a downstream error into the response to send.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        error: GantryError,
    ) -> BoxFuture<'a, Response>;
}

/// An error handler defined by a synchronous closure.
pub struct FnErrorHandler<F> {
    name: &'static str,
    func: F,
}

impl<F> FnErrorHandler<F> {
    /// Creates a named closure error handler.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> ErrorHandler for FnErrorHandler<F>
where
    F: Fn(&mut RequestContext, GantryError) -> Response + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        error: GantryError,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { (self.func)(ctx, error) })
    }
}

/// Registers a closure as an error-handler step (the plain-function shape).
pub fn from_fn<F>(func: F) -> ErrorHandlerSource
where
    F: Fn(&mut RequestContext, GantryError) -> Response + Send + Sync + 'static,
{
    let step: Arc<dyn ErrorHandler> = Arc::new(FnErrorHandler::new("fn_error_handler", func));
    StepSource::Func(step)
}

/// Registers a ready error-handler object (the instance shape).
pub fn instance<H: ErrorHandler>(handler: H) -> ErrorHandlerSource {
    let step: Arc<dyn ErrorHandler> = Arc::new(handler);
    StepSource::Instance(step)
}

/// References an error handler registered in the DI container (the service
/// shape).
#[must_use]
pub fn service<H: ErrorHandler>() -> ErrorHandlerSource {
    StepSource::Service(ServiceLookup::of::<H>(|h| h as Arc<dyn ErrorHandler>))
}

impl<H: ErrorHandler> From<Arc<H>> for ErrorHandlerSource {
    fn from(handler: Arc<H>) -> Self {
        StepSource::Instance(handler as Arc<dyn ErrorHandler>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use http::StatusCode;

    #[tokio::test]
    async fn fn_handler_maps_error_to_response() {
        let container = gantry_core::di::Container::new();
        let handler = from_fn(|_ctx, error: GantryError| {
            Response::empty(error.status_code())
        })
        .resolve(&container)
        .unwrap();

        let mut ctx = RequestContext::mock();
        let response = handler
            .handle(&mut ctx, GantryError::not_found("nothing here"))
            .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
