//! Segment-trie node.
//!
//! Each node owns the children for one path depth. Static segments are
//! matched first, then a parameter segment (`{name}`), then a trailing
//! wildcard (`*name`). The matcher backtracks out of a parameter capture
//! when the deeper subtree fails, so static routes always win over
//! parameterized ones regardless of registration order.

use std::collections::HashMap;

use crate::method_router::MethodRouter;
use crate::params::Params;
use crate::RouteError;

/// One level of the routing trie.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// Children keyed by their literal segment.
    statics: HashMap<String, Node<T>>,
    /// Parameter child: captures one segment under the given name.
    param: Option<(String, Box<Node<T>>)>,
    /// Wildcard terminal: captures the remaining path under the given name.
    wildcard: Option<(String, MethodRouter<T>)>,
    /// Methods registered for the path ending at this node.
    leaf: Option<MethodRouter<T>>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            statics: HashMap::new(),
            param: None,
            wildcard: None,
            leaf: None,
        }
    }
}

impl<T> Node<T> {
    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Inserts a method table at `path`.
    ///
    /// Existing method tables along the same path are merged; a method that
    /// is already present for the exact path is a [`RouteError::MethodConflict`].
    pub fn insert(&mut self, path: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.insert_segments(path, &segments, methods)
    }

    fn insert_segments(
        &mut self,
        path: &str,
        segments: &[&str],
        methods: MethodRouter<T>,
    ) -> Result<(), RouteError> {
        let Some((head, rest)) = segments.split_first() else {
            return merge(path, self.leaf.get_or_insert_with(MethodRouter::new), methods);
        };

        if let Some(name) = head.strip_prefix('*') {
            if !rest.is_empty() {
                return Err(RouteError::TrailingWildcard {
                    path: path.to_string(),
                });
            }
            let (existing_name, table) = self
                .wildcard
                .get_or_insert_with(|| (name.to_string(), MethodRouter::new()));
            if existing_name.as_str() != name {
                return Err(RouteError::CaptureNameConflict {
                    path: path.to_string(),
                    existing: existing_name.clone(),
                });
            }
            return merge(path, table, methods);
        }

        if let Some(name) = head.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            let (existing_name, child) = self
                .param
                .get_or_insert_with(|| (name.to_string(), Box::new(Node::default())));
            if existing_name.as_str() != name {
                return Err(RouteError::CaptureNameConflict {
                    path: path.to_string(),
                    existing: existing_name.clone(),
                });
            }
            return child.insert_segments(path, rest, methods);
        }

        self.statics
            .entry((*head).to_string())
            .or_default()
            .insert_segments(path, rest, methods)
    }

    /// Matches a path against this subtree, filling `params` along the way.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let table = self.match_segments(&segments, &mut params)?;
        Some((table, params))
    }

    fn match_segments<'n>(
        &'n self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'n MethodRouter<T>> {
        let Some((head, rest)) = segments.split_first() else {
            return self.leaf.as_ref();
        };

        if let Some(child) = self.statics.get(*head) {
            if let Some(table) = child.match_segments(rest, params) {
                return Some(table);
            }
        }

        if let Some((name, child)) = &self.param {
            let mark = params.len();
            params.push(name.clone(), (*head).to_string());
            if let Some(table) = child.match_segments(rest, params) {
                return Some(table);
            }
            params.truncate(mark);
        }

        if let Some((name, table)) = &self.wildcard {
            params.push(name.clone(), segments.join("/"));
            return Some(table);
        }

        None
    }
}

fn merge<T>(
    path: &str,
    existing: &mut MethodRouter<T>,
    incoming: MethodRouter<T>,
) -> Result<(), RouteError> {
    // Destructure the incoming table entry by entry so conflicts name the
    // offending method.
    let mut incoming = incoming;
    let methods: Vec<_> = incoming.methods().cloned().collect();
    for method in methods {
        let Some(value) = incoming.take(&method) else {
            continue;
        };
        if !existing.try_insert(method.clone(), value) {
            return Err(RouteError::MethodConflict {
                method,
                path: path.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn static_match() {
        let mut root = Node::root();
        root.insert("/users", MethodRouter::new().get(1)).unwrap();

        let (table, params) = root.match_path("/users").unwrap();
        assert_eq!(table.value(&Method::GET), Some(&1));
        assert!(params.is_empty());
        assert!(root.match_path("/posts").is_none());
    }

    #[test]
    fn param_capture() {
        let mut root = Node::root();
        root.insert("/users/{id}", MethodRouter::new().get(1)).unwrap();

        let (_, params) = root.match_path("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn static_beats_param() {
        let mut root = Node::root();
        root.insert("/users/{id}", MethodRouter::new().get("param"))
            .unwrap();
        root.insert("/users/me", MethodRouter::new().get("static"))
            .unwrap();

        let (table, params) = root.match_path("/users/me").unwrap();
        assert_eq!(table.value(&Method::GET), Some(&"static"));
        assert!(params.is_empty());
    }

    #[test]
    fn backtracks_out_of_param() {
        let mut root = Node::root();
        root.insert("/a/{x}/c", MethodRouter::new().get("param"))
            .unwrap();
        root.insert("/a/b", MethodRouter::new().get("static"))
            .unwrap();

        // "/a/b/c" fails under the static "b" child and must fall back to
        // the parameter branch with x=b.
        let (table, params) = root.match_path("/a/b/c").unwrap();
        assert_eq!(table.value(&Method::GET), Some(&"param"));
        assert_eq!(params.get("x"), Some("b"));
    }

    #[test]
    fn wildcard_captures_remainder() {
        let mut root = Node::root();
        root.insert("/files/*path", MethodRouter::new().get(1)).unwrap();

        let (_, params) = root.match_path("/files/img/logo.png").unwrap();
        assert_eq!(params.get("path"), Some("img/logo.png"));
    }

    #[test]
    fn wildcard_must_be_last() {
        let mut root = Node::root();
        let err = root
            .insert("/files/*path/extra", MethodRouter::<i32>::new().get(1))
            .unwrap_err();
        assert!(matches!(err, RouteError::TrailingWildcard { .. }));
    }

    #[test]
    fn method_conflict_detected() {
        let mut root = Node::root();
        root.insert("/users", MethodRouter::new().get(1)).unwrap();
        let err = root
            .insert("/users", MethodRouter::new().get(2))
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::MethodConflict { ref method, .. } if *method == Method::GET
        ));
    }

    #[test]
    fn capture_name_conflict_detected() {
        let mut root = Node::root();
        root.insert("/users/{id}", MethodRouter::new().get(1)).unwrap();
        let err = root
            .insert("/users/{userId}", MethodRouter::new().post(2))
            .unwrap_err();
        assert!(matches!(err, RouteError::CaptureNameConflict { .. }));
    }

    #[test]
    fn root_path() {
        let mut root = Node::root();
        root.insert("/", MethodRouter::new().get("index")).unwrap();

        let (table, _) = root.match_path("/").unwrap();
        assert_eq!(table.value(&Method::GET), Some(&"index"));
    }
}
