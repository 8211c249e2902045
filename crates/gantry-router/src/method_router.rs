//! Per-path method table.
//!
//! A [`MethodRouter`] maps HTTP methods to a route value for a single path.
//! The router is generic over the value type so callers can store whatever
//! identifies the handler on their side (an index, an id string, a boxed
//! handler).

use http::Method;
use smallvec::SmallVec;

/// Methods stored inline per path; real services rarely exceed this.
const INLINE_METHODS: usize = 4;

/// Maps HTTP methods to a route value for one path.
///
/// # Example
///
/// ```rust
/// use gantry_router::MethodRouter;
/// use http::Method;
///
/// let methods = MethodRouter::new().get("list").post("create");
///
/// assert_eq!(methods.value(&Method::GET), Some(&"list"));
/// assert_eq!(methods.value(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); INLINE_METHODS]>,
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Registers a value for GET.
    #[must_use]
    pub fn get(self, value: T) -> Self {
        self.method(Method::GET, value)
    }

    /// Registers a value for POST.
    #[must_use]
    pub fn post(self, value: T) -> Self {
        self.method(Method::POST, value)
    }

    /// Registers a value for PUT.
    #[must_use]
    pub fn put(self, value: T) -> Self {
        self.method(Method::PUT, value)
    }

    /// Registers a value for PATCH.
    #[must_use]
    pub fn patch(self, value: T) -> Self {
        self.method(Method::PATCH, value)
    }

    /// Registers a value for DELETE.
    #[must_use]
    pub fn delete(self, value: T) -> Self {
        self.method(Method::DELETE, value)
    }

    /// Registers a value for an arbitrary method, replacing any existing
    /// entry for that method.
    #[must_use]
    pub fn method(mut self, method: Method, value: T) -> Self {
        self.set(method, value);
        self
    }

    /// Inserts a value for a method.
    ///
    /// Returns `false` if the method was already registered; the existing
    /// entry is left untouched in that case.
    pub fn try_insert(&mut self, method: Method, value: T) -> bool {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return false;
        }
        self.entries.push((method, value));
        true
    }

    /// Inserts or replaces the value for a method.
    pub fn set(&mut self, method: Method, value: T) {
        if let Some(entry) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            entry.1 = value;
        } else {
            self.entries.push((method, value));
        }
    }

    /// Removes and returns the value registered for a method.
    pub fn take(&mut self, method: &Method) -> Option<T> {
        let index = self.entries.iter().position(|(m, _)| m == method)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns the value registered for a method.
    #[must_use]
    pub fn value(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns the methods registered for this path.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.entries.iter().map(|(m, _)| m)
    }

    /// Returns `true` if no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
