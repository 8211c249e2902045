//! Guards: steps that permit or deny continuation.
//!
//! A guard inspects the request context and returns a [`Verdict`].
//! Anything but [`Verdict::Allow`] stops the pipeline: the guard adapter
//! answers with a problem response carrying the denial's status code, and
//! no later step runs. A denial is data, never an error — an `Err` from a
//! guard means the guard itself broke and follows the step-error path.

use crate::step::{ServiceLookup, StepSource};
use crate::types::BoxFuture;
use gantry_core::{GantryResult, RequestContext};
use http::StatusCode;
use std::sync::Arc;

/// A step source holding a guard.
pub type GuardSource = StepSource<dyn Guard>;

/// The explicit denial codes a guard can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Denial {
    /// The caller is not authenticated (401).
    Unauthorized,
    /// The caller is authenticated but not allowed (403).
    Forbidden,
}

impl Denial {
    /// Returns the HTTP status for this denial.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

/// The outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Continue to the next step.
    Allow,
    /// Stop the chain and answer with the denial's status.
    Deny(Denial),
}

impl Verdict {
    /// Returns `true` when the chain may continue.
    #[must_use]
    pub const fn allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl From<bool> for Verdict {
    /// `true` allows; `false` denies with 401.
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny(Denial::Unauthorized)
        }
    }
}

impl From<Denial> for Verdict {
    fn from(denial: Denial) -> Self {
        Self::Deny(denial)
    }
}

/// A step deciding whether the pipeline may continue.
///
/// # Example
///
/// ```rust
/// use gantry_core::{GantryResult, RequestContext};
/// use gantry_pipeline::{BoxFuture, Denial, Guard, Verdict};
///
/// struct RequireAuthenticated;
///
/// impl Guard for RequireAuthenticated {
///     fn name(&self) -> &'static str {
///         "require_authenticated"
///     }
///
///     fn check<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, GantryResult<Verdict>> {
///         Box::pin(async move {
///             Ok(Verdict::from(ctx.principal().is_authenticated()))
///         })
///     }
/// }
/// ```
pub trait Guard: Send + Sync + 'static {
    /// The name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "guard"
    }

    /// Decides whether the chain may continue past this guard.
    fn check<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, GantryResult<Verdict>>;
}

/// A guard defined by a synchronous closure.
pub struct FnGuard<F> {
    name: &'static str,
    func: F,
}

impl<F> FnGuard<F> {
    /// Creates a named closure guard.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Guard for FnGuard<F>
where
    F: Fn(&RequestContext) -> Verdict + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn check<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, GantryResult<Verdict>> {
        Box::pin(async move { Ok((self.func)(ctx)) })
    }
}

/// Registers a closure as a guard step (the plain-function shape).
///
/// The closure may return anything convertible into a [`Verdict`]; in
/// particular a bare `bool`, where `false` denies with 401.
pub fn from_fn<F, V>(func: F) -> GuardSource
where
    F: Fn(&RequestContext) -> V + Send + Sync + 'static,
    V: Into<Verdict>,
{
    let adapted = move |ctx: &RequestContext| func(ctx).into();
    let step: Arc<dyn Guard> = Arc::new(FnGuard::new("fn_guard", adapted));
    StepSource::Func(step)
}

/// Registers a ready guard object (the instance shape).
pub fn instance<G: Guard>(guard: G) -> GuardSource {
    let step: Arc<dyn Guard> = Arc::new(guard);
    StepSource::Instance(step)
}

/// References a guard registered in the DI container (the service shape).
#[must_use]
pub fn service<G: Guard>() -> GuardSource {
    StepSource::Service(ServiceLookup::of::<G>(|g| g as Arc<dyn Guard>))
}

impl<G: Guard> From<Arc<G>> for GuardSource {
    fn from(guard: Arc<G>) -> Self {
        StepSource::Instance(guard as Arc<dyn Guard>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion() {
        assert_eq!(Verdict::from(true), Verdict::Allow);
        assert_eq!(Verdict::from(false), Verdict::Deny(Denial::Unauthorized));
        assert!(Verdict::Allow.allowed());
        assert!(!Verdict::from(false).allowed());
    }

    #[test]
    fn denial_statuses() {
        assert_eq!(Denial::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Denial::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            Verdict::from(Denial::Forbidden),
            Verdict::Deny(Denial::Forbidden)
        );
    }

    #[tokio::test]
    async fn fn_guard_checks() {
        let container = gantry_core::di::Container::new();
        let guard = from_fn(|ctx: &RequestContext| ctx.principal().is_authenticated())
            .resolve(&container)
            .unwrap();

        let mut ctx = RequestContext::mock();
        assert_eq!(
            guard.check(&ctx).await.unwrap(),
            Verdict::Deny(Denial::Unauthorized)
        );

        ctx.principal_mut().authenticate();
        assert_eq!(guard.check(&ctx).await.unwrap(), Verdict::Allow);
    }

    #[tokio::test]
    async fn denial_closure() {
        let container = gantry_core::di::Container::new();
        let guard = from_fn(|_: &RequestContext| Denial::Forbidden)
            .resolve(&container)
            .unwrap();

        let ctx = RequestContext::mock();
        assert_eq!(
            guard.check(&ctx).await.unwrap(),
            Verdict::Deny(Denial::Forbidden)
        );
    }
}
