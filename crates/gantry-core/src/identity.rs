//! Caller identity attached to a request.
//!
//! Every [`RequestContext`](crate::RequestContext) carries exactly one
//! [`Principal`]. Steps that authenticate a caller (an interceptor decoding
//! a session token, a middleware validating a client certificate) flip the
//! flags and attach claims; guards read them to decide whether the chain
//! may continue.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The identity state of the caller for one request.
///
/// A fresh principal is anonymous: not authenticated, not authorized, no
/// claims. Both flags are one-way within a request; nothing in the pipeline
/// un-authenticates a caller once a step has vouched for it.
///
/// # Example
///
/// ```rust
/// use gantry_core::Principal;
///
/// let mut principal = Principal::anonymous();
/// assert!(!principal.is_authenticated());
///
/// principal.authenticate();
/// principal.set_claim("sub", "user-123");
///
/// assert!(principal.is_authenticated());
/// assert_eq!(principal.claim("sub").and_then(|v| v.as_str()), Some("user-123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    authenticated: bool,
    authorized: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    claims: HashMap<String, serde_json::Value>,
}

impl Principal {
    /// Creates an anonymous principal with no claims.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns `true` once a step has authenticated the caller.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Marks the caller as authenticated.
    pub fn authenticate(&mut self) {
        self.authenticated = true;
    }

    /// Returns `true` once a step has authorized the caller.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Marks the caller as authorized.
    pub fn authorize(&mut self) {
        self.authorized = true;
    }

    /// Returns the claim stored under `name`, if any.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.claims.get(name)
    }

    /// Stores a claim, replacing any previous value under the same name.
    pub fn set_claim(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.claims.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`Principal::set_claim`].
    #[must_use]
    pub fn with_claim(
        mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.set_claim(name, value);
        self
    }

    /// Returns all claims attached to this principal.
    #[must_use]
    pub fn claims(&self) -> &HashMap<String, serde_json::Value> {
        &self.claims
    }

    /// A short identifier for log lines: the `sub` claim when present,
    /// `"anonymous"` otherwise. Never includes secrets.
    #[must_use]
    pub fn log_id(&self) -> String {
        self.claim("sub")
            .and_then(|v| v.as_str())
            .map_or_else(|| "anonymous".to_string(), ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_principal_is_anonymous() {
        let principal = Principal::anonymous();
        assert!(!principal.is_authenticated());
        assert!(!principal.is_authorized());
        assert!(principal.claims().is_empty());
        assert_eq!(principal.log_id(), "anonymous");
    }

    #[test]
    fn authenticate_and_authorize() {
        let mut principal = Principal::anonymous();
        principal.authenticate();
        principal.authorize();

        assert!(principal.is_authenticated());
        assert!(principal.is_authorized());
    }

    #[test]
    fn claims_round_trip() {
        let principal = Principal::anonymous()
            .with_claim("sub", "user-9")
            .with_claim("admin", true);

        assert_eq!(
            principal.claim("sub").and_then(|v| v.as_str()),
            Some("user-9")
        );
        assert_eq!(
            principal.claim("admin").and_then(serde_json::Value::as_bool),
            Some(true)
        );
        assert_eq!(principal.log_id(), "user-9");
    }

    #[test]
    fn serialization_shape() {
        let mut principal = Principal::anonymous();
        principal.authenticate();
        principal.set_claim("sub", "u1");

        let json = serde_json::to_value(&principal).expect("serializable");
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["authorized"], false);
        assert_eq!(json["claims"]["sub"], "u1");

        let parsed: Principal = serde_json::from_value(json).expect("deserializable");
        assert_eq!(parsed, principal);
    }
}
