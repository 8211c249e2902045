//! Problem-details response bodies.
//!
//! Denials and failures are reported to clients as RFC 7807 problem
//! details: a JSON object with a stable `type`/`title`/`status`/`instance`
//! shape. Guard denials and unhandled errors both go through this type so
//! every error response looks the same on the wire.

use crate::GantryError;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// An RFC 7807 problem-details payload.
///
/// # Example
///
/// ```rust
/// use gantry_core::Problem;
/// use http::StatusCode;
///
/// let problem = Problem::from_status(StatusCode::UNAUTHORIZED)
///     .with_instance("/admin");
///
/// assert_eq!(problem.status, 401);
/// assert_eq!(problem.title, "Unauthorized");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// A URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub problem_type: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference identifying this specific occurrence, typically the
    /// request path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    /// Creates a problem for a status code, titled with the status's
    /// canonical reason phrase.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// A 401 Unauthorized problem.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::from_status(StatusCode::UNAUTHORIZED)
    }

    /// A 403 Forbidden problem.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::from_status(StatusCode::FORBIDDEN)
    }

    /// A 404 Not Found problem.
    #[must_use]
    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    /// A 500 Internal Server Error problem.
    #[must_use]
    pub fn internal_server_error() -> Self {
        Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Builds a problem from a pipeline error, using the error's status
    /// mapping and its message as the detail.
    #[must_use]
    pub fn from_error(error: &GantryError) -> Self {
        Self::from_status(error.status_code()).with_detail(error.to_string())
    }

    /// Sets the problem type URI.
    #[must_use]
    pub fn with_type(mut self, problem_type: impl Into<String>) -> Self {
        self.problem_type = problem_type.into();
        self
    }

    /// Sets the occurrence detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the occurrence instance, typically the request path.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Returns the status as a typed [`StatusCode`].
    ///
    /// Falls back to 500 if the stored status is somehow out of range,
    /// which cannot happen for problems built through the constructors.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_uses_canonical_title() {
        let problem = Problem::from_status(StatusCode::FORBIDDEN);
        assert_eq!(problem.title, "Forbidden");
        assert_eq!(problem.status, 403);
        assert_eq!(problem.problem_type, "about:blank");
    }

    #[test]
    fn serialization_shape() {
        let problem = Problem::unauthorized().with_instance("/admin");
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["title"], "Unauthorized");
        assert_eq!(json["status"], 401);
        assert_eq!(json["instance"], "/admin");
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn from_error_maps_status_and_detail() {
        let error = GantryError::not_found("widget 7 does not exist");
        let problem = Problem::from_error(&error);

        assert_eq!(problem.status, 404);
        assert!(problem.detail.as_deref().unwrap().contains("widget 7"));
    }

    #[test]
    fn round_trip() {
        let problem = Problem::forbidden().with_detail("missing role");
        let json = serde_json::to_string(&problem).unwrap();
        let parsed: Problem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, problem);
    }
}
