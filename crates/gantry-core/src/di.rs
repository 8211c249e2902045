//! Dependency injection registry.
//!
//! Services are registered once at startup and resolved by type. The
//! pipeline consumes the container through a single capability —
//! [`Container::resolve`] — when it materializes service-referenced steps
//! at build time; application handlers can use the same container for
//! their own collaborators.
//!
//! The container is an explicit value passed where it is needed. There is
//! no process-wide singleton; its lifetime is the application's.
//!
//! # Example
//!
//! ```rust
//! use gantry_core::di::Container;
//! use std::sync::Arc;
//!
//! struct UserStore {
//!     dsn: String,
//! }
//!
//! let mut container = Container::new();
//! container.register(Arc::new(UserStore { dsn: "postgres://localhost/app".into() }));
//!
//! let store: Arc<UserStore> = container.resolve().unwrap();
//! assert_eq!(store.dsn, "postgres://localhost/app");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error when a service cannot be resolved.
#[derive(Debug, Clone)]
pub struct InjectionError {
    /// The type name that could not be resolved.
    pub type_name: &'static str,
}

impl fmt::Display for InjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service {} is not registered", self.type_name)
    }
}

impl std::error::Error for InjectionError {}

impl InjectionError {
    /// Creates an error for an unregistered service type.
    #[must_use]
    pub fn not_registered<T>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// A type-keyed service registry.
///
/// Stores `Arc`-wrapped services keyed by their concrete type. The
/// container is `Send + Sync`; registration happens during startup,
/// resolution afterwards, so no interior locking is needed.
#[derive(Default)]
pub struct Container {
    services: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers a service, replacing any previous registration of the
    /// same type.
    pub fn register<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.services.insert(TypeId::of::<T>(), service);
    }

    /// Builder-style variant of [`Container::register`].
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.register(service);
        self
    }

    /// Resolves a service by type.
    ///
    /// Returns `None` when the type was never registered.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|s| Arc::clone(s).downcast::<T>().ok())
    }

    /// Resolves a service or reports which type is missing.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] when the service is not registered.
    pub fn resolve_required<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, InjectionError> {
        self.resolve().ok_or_else(InjectionError::not_registered::<T>)
    }

    /// Returns `true` if a service of the given type is registered.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.services.len())
            .finish()
    }
}

/// A deref wrapper for a resolved service.
///
/// `Inject<T>` makes a resolved dependency read like a plain reference in
/// handler code.
///
/// # Example
///
/// ```rust
/// use gantry_core::di::{Container, Inject};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Clock {
///     fn now(&self) -> u64 { 0 }
/// }
///
/// let container = Container::new().with(Arc::new(Clock));
/// let clock: Inject<Clock> = Inject::from_container(&container).unwrap();
/// assert_eq!(clock.now(), 0);
/// ```
#[derive(Clone)]
pub struct Inject<T>(pub Arc<T>);

impl<T> Inject<T> {
    /// Wraps an already-resolved service.
    pub fn new(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Converts into the inner `Arc`.
    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T: Send + Sync + 'static> Inject<T> {
    /// Resolves the service from a container.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError`] when the service is not registered.
    pub fn from_container(container: &Container) -> Result<Self, InjectionError> {
        container.resolve_required::<T>().map(Inject)
    }
}

impl<T> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Inject").field(&self.0).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Greeter {
        greeting: String,
    }

    #[test]
    fn register_and_resolve() {
        let mut container = Container::new();
        container.register(Arc::new(Greeter {
            greeting: "hello".to_string(),
        }));

        let greeter: Arc<Greeter> = container.resolve().unwrap();
        assert_eq!(greeter.greeting, "hello");
    }

    #[test]
    fn resolve_missing_is_none() {
        let container = Container::new();
        assert!(container.resolve::<Greeter>().is_none());
    }

    #[test]
    fn resolve_required_names_the_type() {
        let container = Container::new();
        let err = container.resolve_required::<Greeter>().unwrap_err();
        assert!(err.to_string().contains("Greeter"));
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn re_registration_replaces() {
        let mut container = Container::new();
        container.register(Arc::new(Greeter {
            greeting: "first".to_string(),
        }));
        container.register(Arc::new(Greeter {
            greeting: "second".to_string(),
        }));

        assert_eq!(container.len(), 1);
        assert_eq!(container.resolve::<Greeter>().unwrap().greeting, "second");
    }

    #[test]
    fn contains_and_len() {
        struct Other;

        let container = Container::new()
            .with(Arc::new(Greeter {
                greeting: "hi".to_string(),
            }))
            .with(Arc::new(Other));

        assert!(container.contains::<Greeter>());
        assert!(container.contains::<Other>());
        assert_eq!(container.len(), 2);
        assert!(!container.is_empty());
    }

    #[test]
    fn inject_derefs() {
        let container = Container::new().with(Arc::new(Greeter {
            greeting: "yo".to_string(),
        }));

        let inject: Inject<Greeter> = Inject::from_container(&container).unwrap();
        assert_eq!(inject.greeting, "yo");
    }

    #[test]
    fn inject_missing_errors() {
        let container = Container::new();
        assert!(Inject::<Greeter>::from_container(&container).is_err());
    }
}
