//! Test error types.

use std::fmt;

use gantry_core::GantryError;

/// Errors that can occur during testing.
#[derive(Debug)]
pub enum TestError {
    /// Request building failed.
    RequestBuild(String),
    /// A header name or value was invalid.
    InvalidHeader(String),
    /// The response body was not valid UTF-8.
    BodyEncoding(String),
    /// JSON serialization or deserialization failed.
    Json(serde_json::Error),
    /// The pipeline returned an unhandled error.
    Pipeline(GantryError),
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestBuild(msg) => write!(f, "Request build error: {msg}"),
            Self::InvalidHeader(msg) => write!(f, "Invalid header: {msg}"),
            Self::BodyEncoding(msg) => write!(f, "Body encoding error: {msg}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Pipeline(e) => write!(f, "Unhandled pipeline error: {e}"),
        }
    }
}

impl std::error::Error for TestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
