//! Error types for Gantry.
//!
//! [`GantryError`] is the error type carried through the pipeline. Every
//! variant maps to an [`ErrorCategory`], and every category maps to a
//! default HTTP status code, so a caught error can always be turned into a
//! response without guessing.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`GantryError`].
pub type GantryResult<T> = Result<T, GantryError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A pipeline step could not be resolved at build time.
    Resolution,
    /// Request validation errors (invalid input, malformed body).
    Validation,
    /// Authentication errors (invalid or missing credentials).
    Authentication,
    /// Authorization errors (permission denied).
    Authorization,
    /// Resource not found.
    NotFound,
    /// Request timeout.
    Timeout,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Resolution | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for the Gantry pipeline.
///
/// Steps return `Result<_, GantryError>`; the nearest error handler (or the
/// server's default handling) turns the error into a response using
/// [`GantryError::status_code`].
///
/// # Example
///
/// ```rust
/// use gantry_core::{GantryError, GantryResult};
///
/// fn load_widget(id: &str) -> GantryResult<String> {
///     if id.is_empty() {
///         return Err(GantryError::validation("widget id must not be empty"));
///     }
///     Ok(format!("widget {id}"))
/// }
/// ```
#[derive(Error, Debug)]
pub enum GantryError {
    /// A step value could not be resolved into an invocable step.
    ///
    /// This is a programmer error raised while building the pipeline,
    /// never while serving a request.
    #[error("Resolution error: {message}")]
    Resolution {
        /// What failed to resolve, and why.
        message: String,
    },

    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Authorization denied.
    #[error("Authorization denied: {message}")]
    Authorization {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Request timed out.
    #[error("Timeout: {message}")]
    Timeout {
        /// Human-readable error message.
        message: String,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error. Not exposed to clients.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl GantryError {
    /// Creates a resolution error.
    #[must_use]
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates an authorization error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error wrapping a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Resolution { .. } => ErrorCategory::Resolution,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_statuses() {
        assert_eq!(
            GantryError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GantryError::authentication("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GantryError::authorization("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GantryError::not_found("gone").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GantryError::timeout("slow").status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GantryError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GantryError::resolution("unknown step").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_includes_message() {
        let error = GantryError::not_found("widget 7");
        assert!(error.to_string().contains("widget 7"));
    }

    #[test]
    fn internal_source_is_chained() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = GantryError::internal_with_source("storage failed", io);

        let source = std::error::Error::source(&error).expect("has source");
        assert!(source.to_string().contains("disk on fire"));
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
