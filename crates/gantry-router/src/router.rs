//! High-level router API.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::{RouteError, RouteMatch};

/// A path router over a segment trie.
///
/// Generic over the route value `T`; the framework stores endpoint slots,
/// applications embedding the router directly can store whatever identifies
/// a handler for them.
///
/// # Example
///
/// ```rust
/// use gantry_router::{MethodRouter, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/users", MethodRouter::new().get(0).post(1)).unwrap();
/// router.insert("/users/{id}", MethodRouter::new().get(2)).unwrap();
///
/// let matched = router.match_route(&Method::GET, "/users/7").unwrap();
/// assert_eq!(*matched.value, 2);
/// assert_eq!(matched.params.get("id"), Some("7"));
/// ```
///
/// # Priority
///
/// When several patterns could match a path, static segments win over
/// `{param}` segments, which win over a trailing `*wildcard`.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Inserts a method table at a path pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when a method is already registered for the
    /// path, when capture names disagree with an earlier registration, or
    /// when a wildcard is not the final segment.
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        self.root.insert(path, methods)?;
        self.route_count += 1;
        Ok(())
    }

    /// Registers a single method+path route.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Router::insert`].
    pub fn route(&mut self, method: Method, path: &str, value: T) -> Result<(), RouteError> {
        self.insert(path, MethodRouter::new().method(method, value))
    }

    /// Matches a method and path, returning the route value and captured
    /// parameters.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (table, params) = self.root.match_path(path)?;
        let value = table.value(method)?;
        Some(RouteMatch { value, params })
    }

    /// Matches a path without a method, returning the full method table.
    ///
    /// Useful for distinguishing "unknown path" from "known path, wrong
    /// method".
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of registered route patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
