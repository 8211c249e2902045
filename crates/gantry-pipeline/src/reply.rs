//! Response descriptors.
//!
//! Endpoints return a [`Reply`]: what the response should be, not yet how
//! it is laid out on the wire. Status defaults to 200, an absent payload
//! means an empty body, and the payload kind decides the default
//! content-type unless the endpoint set one explicitly.

use crate::types::StepResult;
use bytes::Bytes;
use gantry_core::GantryError;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The body payload of a [`Reply`].
#[derive(Debug, Clone)]
pub enum Payload {
    /// A JSON document, serialized with `application/json`.
    Json(serde_json::Value),
    /// Plain text, served as `text/plain; charset=utf-8`.
    Text(String),
    /// Raw bytes, served as `application/octet-stream`.
    Raw(Bytes),
    /// A file read from disk when the response is built; content-type is
    /// guessed from the extension.
    File(PathBuf),
}

/// A response descriptor produced by an endpoint.
///
/// # Example
///
/// ```rust
/// use gantry_pipeline::Reply;
/// use http::StatusCode;
///
/// let reply = Reply::text("created").with_status(StatusCode::CREATED);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reply {
    status: Option<StatusCode>,
    payload: Option<Payload>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl Reply {
    /// An empty 200 response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty response with the given status.
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self::new().with_status(status)
    }

    /// An empty 204 No Content response.
    #[must_use]
    pub fn no_content() -> Self {
        Self::status(StatusCode::NO_CONTENT)
    }

    /// A plain-text reply.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            payload: Some(Payload::Text(text.into())),
            ..Self::default()
        }
    }

    /// A JSON reply from an already-built value.
    #[must_use]
    pub fn json_value(value: serde_json::Value) -> Self {
        Self {
            payload: Some(Payload::Json(value)),
            ..Self::default()
        }
    }

    /// A JSON reply serialized from any `Serialize` value.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value cannot be represented as
    /// JSON (e.g. a map with non-string keys).
    pub fn json<T: Serialize>(value: &T) -> Result<Self, GantryError> {
        let value = serde_json::to_value(value)
            .map_err(|e| GantryError::validation(format!("unserializable response body: {e}")))?;
        Ok(Self::json_value(value))
    }

    /// A raw-bytes reply.
    #[must_use]
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self {
            payload: Some(Payload::Raw(data.into())),
            ..Self::default()
        }
    }

    /// A reply that serves a file from disk.
    ///
    /// The file is read when the response is built; a missing or unreadable
    /// file becomes an internal error at that point.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            payload: Some(Payload::File(path.into())),
            ..Self::default()
        }
    }

    /// Overrides the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Returns the status this reply will use (200 when unset).
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Returns the payload, if any.
    #[must_use]
    pub const fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Builds the wire response.
    ///
    /// # Errors
    ///
    /// Returns an internal error when a file payload cannot be read.
    pub async fn into_response(self) -> StepResult {
        let status = self.status.unwrap_or(StatusCode::OK);

        let (body, default_content_type) = match self.payload {
            None => (Bytes::new(), None),
            Some(Payload::Json(value)) => {
                (Bytes::from(value.to_string()), Some("application/json"))
            }
            Some(Payload::Text(text)) => {
                (Bytes::from(text), Some("text/plain; charset=utf-8"))
            }
            Some(Payload::Raw(data)) => (data, Some("application/octet-stream")),
            Some(Payload::File(path)) => {
                let data = tokio::fs::read(&path).await.map_err(|e| {
                    GantryError::internal_with_source(
                        format!("failed to read {}", path.display()),
                        e,
                    )
                })?;
                (Bytes::from(data), Some(content_type_for(&path)))
            }
        };

        let mut builder = http::Response::builder().status(status);

        let explicit_content_type = self.headers.iter().any(|(n, _)| n == CONTENT_TYPE);
        if let Some(content_type) = default_content_type {
            if !explicit_content_type {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        builder
            .body(Full::new(body))
            .map_err(|e| GantryError::internal_with_source("failed to build response", e))
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Self::json_value(value)
    }
}

impl From<StatusCode> for Reply {
    fn from(status: StatusCode) -> Self {
        Self::status(status)
    }
}

/// Guesses a content-type from a file extension.
///
/// Unknown extensions fall back to `application/octet-stream`.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
