//! Path router for the Gantry framework.
//!
//! Routes are patterns made of literal segments, `{param}` captures, and an
//! optional trailing `*wildcard` capture, stored in a per-segment trie.
//! Matching is deterministic: static segments beat parameter captures, which
//! beat wildcards, independent of registration order.
//!
//! # Example
//!
//! ```rust
//! use gantry_router::{MethodRouter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/users", MethodRouter::new().get("listUsers")).unwrap();
//! router.insert("/users/{id}", MethodRouter::new().get("getUser")).unwrap();
//! router.insert("/assets/*path", MethodRouter::new().get("serveAsset")).unwrap();
//!
//! let matched = router.match_route(&Method::GET, "/users/7").unwrap();
//! assert_eq!(*matched.value, "getUser");
//! assert_eq!(matched.params.get("id"), Some("7"));
//! ```

#![doc(html_root_url = "https://docs.rs/gantry-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod method_router;
mod node;
mod params;
mod router;

pub use method_router::MethodRouter;
pub use node::Node;
pub use params::Params;
pub use router::Router;

use http::Method;

/// A successful route match: the stored value plus captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched method and path.
    pub value: &'a T,
    /// Parameters captured from `{param}` and `*wildcard` segments.
    pub params: Params,
}

/// Errors raised while registering routes.
///
/// All of these are programmer errors: they are reported when the routing
/// table is built, never while serving requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The method is already registered for this exact path.
    MethodConflict {
        /// The conflicting method.
        method: Method,
        /// The path pattern being registered.
        path: String,
    },
    /// A capture at this position was registered earlier under another name.
    CaptureNameConflict {
        /// The path pattern being registered.
        path: String,
        /// The previously registered capture name.
        existing: String,
    },
    /// A `*wildcard` segment was followed by more segments.
    TrailingWildcard {
        /// The offending path pattern.
        path: String,
    },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MethodConflict { method, path } => {
                write!(f, "route {method} {path} is already registered")
            }
            Self::CaptureNameConflict { path, existing } => write!(
                f,
                "capture in {path} conflicts with earlier capture name '{existing}'"
            ),
            Self::TrailingWildcard { path } => {
                write!(f, "wildcard segment must be last in {path}")
            }
        }
    }
}

impl std::error::Error for RouteError {}
