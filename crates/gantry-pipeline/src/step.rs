//! Step sources and resolution.
//!
//! Anywhere the builder accepts a pipeline step it accepts a
//! [`StepSource`]: a tagged union over the four shapes a step can take.
//! The shape is chosen at registration time, by construction — there is no
//! runtime inspection deciding what a value "looks like".
//!
//! | Variant    | Meaning                                                  |
//! |------------|----------------------------------------------------------|
//! | `Func`     | A plain function or closure adapted into the step trait  |
//! | `Instance` | A ready, possibly stateful, step object                  |
//! | `Factory`  | Produces another source; resolved recursively            |
//! | `Service`  | Looked up in the DI container when the pipeline is built |
//!
//! Resolution happens once, inside `PipelineBuilder::build`, and is pure:
//! it inspects nothing but the source itself and the container. A factory
//! may return another factory; resolution recurses until a non-factory
//! shape appears or [`MAX_FACTORY_DEPTH`] is exceeded. Failures are
//! programmer errors and surface as descriptive [`ResolveError`]s before
//! the pipeline ever sees a request.

use gantry_core::di::Container;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// How many nested factories resolution will follow before giving up.
pub const MAX_FACTORY_DEPTH: usize = 32;

/// The four shapes a registered step can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// A plain function or closure.
    Func,
    /// A ready step object.
    Instance,
    /// A factory producing another source.
    Factory,
    /// A container lookup deferred to build time.
    Service,
}

impl StepKind {
    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Func => "func",
            Self::Instance => "instance",
            Self::Factory => "factory",
            Self::Service => "service",
        }
    }
}

/// A factory for a pipeline step.
///
/// `create` may return any [`StepSource`], including another factory;
/// resolution feeds the output back into itself.
pub trait StepFactory<T: ?Sized + Send + Sync + 'static>: Send + Sync + 'static {
    /// Produces the next source in the resolution chain.
    fn create(&self) -> StepSource<T>;
}

impl<T, F> StepFactory<T> for F
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn() -> StepSource<T> + Send + Sync + 'static,
{
    fn create(&self) -> StepSource<T> {
        (self)()
    }
}

/// A deferred container lookup for a service-referenced step.
///
/// Built by the per-trait `service::<S>()` helpers, which capture the
/// concrete type's name (for diagnostics) and the coercion from
/// `Arc<S>` to the step trait object.
pub struct ServiceLookup<T: ?Sized> {
    type_name: &'static str,
    lookup: Box<dyn Fn(&Container) -> Option<Arc<T>> + Send + Sync>,
}

impl<T: ?Sized> ServiceLookup<T> {
    /// Creates a lookup for concrete service type `S`, with the coercion
    /// into the step trait object.
    pub fn of<S>(coerce: impl Fn(Arc<S>) -> Arc<T> + Send + Sync + 'static) -> Self
    where
        S: Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<S>(),
            lookup: Box::new(move |container| container.resolve::<S>().map(&coerce)),
        }
    }

    /// Returns the concrete type name this lookup resolves.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A registered pipeline step, in one of its four shapes.
///
/// `T` is the step trait object (`dyn Middleware`, `dyn Guard`, ...); the
/// per-trait modules define aliases and constructors so application code
/// rarely names this type directly.
pub enum StepSource<T: ?Sized + Send + Sync + 'static> {
    /// A plain function or closure, pre-wrapped in its `Fn*` adapter.
    Func(Arc<T>),
    /// A ready step object.
    Instance(Arc<T>),
    /// A factory producing another source.
    Factory(Box<dyn StepFactory<T>>),
    /// A container lookup deferred to build time.
    Service(ServiceLookup<T>),
}

impl<T: ?Sized + Send + Sync + 'static> StepSource<T> {
    /// Wraps a factory.
    #[must_use]
    pub fn factory<F: StepFactory<T>>(factory: F) -> Self {
        Self::Factory(Box::new(factory))
    }

    /// Returns which of the four shapes this source is.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Func(_) => StepKind::Func,
            Self::Instance(_) => StepKind::Instance,
            Self::Factory(_) => StepKind::Factory,
            Self::Service(_) => StepKind::Service,
        }
    }

    /// Resolves this source down to an invocable step.
    ///
    /// Factories recurse; service references hit the container exactly
    /// once. Pure inspection, no side effects.
    ///
    /// # Errors
    ///
    /// [`ResolveError::ServiceNotRegistered`] when a service reference
    /// names a type absent from the container, and
    /// [`ResolveError::FactoryRecursion`] when factories nest past
    /// [`MAX_FACTORY_DEPTH`].
    pub fn resolve(self, container: &Container) -> Result<Arc<T>, ResolveError> {
        self.resolve_at_depth(container, 0)
    }

    fn resolve_at_depth(
        self,
        container: &Container,
        depth: usize,
    ) -> Result<Arc<T>, ResolveError> {
        match self {
            Self::Func(step) | Self::Instance(step) => Ok(step),
            Self::Factory(factory) => {
                if depth >= MAX_FACTORY_DEPTH {
                    return Err(ResolveError::FactoryRecursion {
                        depth: MAX_FACTORY_DEPTH,
                    });
                }
                factory.create().resolve_at_depth(container, depth + 1)
            }
            Self::Service(lookup) => (lookup.lookup)(container)
                .ok_or(ResolveError::ServiceNotRegistered {
                    type_name: lookup.type_name,
                }),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for StepSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StepSource");
        debug.field("kind", &self.kind().name());
        if let Self::Service(lookup) = self {
            debug.field("service", &lookup.type_name);
        }
        debug.finish()
    }
}

/// Errors raised while resolving a step source.
///
/// These are programmer errors: they surface from `PipelineBuilder::build`,
/// never while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A service reference named a type that is not in the container.
    #[error("step service {type_name} is not registered in the container")]
    ServiceNotRegistered {
        /// The concrete type name of the missing service.
        type_name: &'static str,
    },
    /// Factories kept producing factories past the recursion cap.
    #[error("step factory recursed past {depth} levels without producing a step")]
    FactoryRecursion {
        /// The recursion cap that was hit.
        depth: usize,
    },
}
