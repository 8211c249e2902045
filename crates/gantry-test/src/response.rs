//! Test response inspection.

use crate::error::TestError;
use bytes::Bytes;
use gantry_pipeline::Response;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// A fully-read response from a test dispatch.
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads an HTTP response into a test response.
    pub async fn from_http(response: Response) -> Result<Self, TestError> {
        let (parts, body) = response.into_parts();
        // Full<Bytes> collection cannot fail.
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(_) => Bytes::new(),
        };

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response status as a bare number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyEncoding`] when the body is not UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyEncoding(e.to_string()))
    }

    /// Deserializes the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Parses the body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] when the body is not valid JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the response status, panicking with the body on mismatch.
    ///
    /// # Panics
    ///
    /// Panics when the status differs; the message includes the body to
    /// make failures readable.
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status_code(),
            expected,
            "unexpected status (body: {})",
            self.text().unwrap_or_else(|_| "<non-utf8>".to_string())
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: StatusCode, body: &'static str) -> Response {
        http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .expect("valid response")
    }

    #[tokio::test]
    async fn reads_status_headers_and_body() {
        let test_response = TestResponse::from_http(response(StatusCode::OK, r#"{"ok":true}"#))
            .await
            .unwrap();

        assert_eq!(test_response.status_code(), 200);
        assert!(test_response.is_success());
        assert_eq!(test_response.header("content-type"), Some("application/json"));
        assert_eq!(test_response.text().unwrap(), r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn json_deserialization() {
        #[derive(serde::Deserialize)]
        struct Body {
            ok: bool,
        }

        let test_response = TestResponse::from_http(response(StatusCode::OK, r#"{"ok":true}"#))
            .await
            .unwrap();

        let body: Body = test_response.json().unwrap();
        assert!(body.ok);

        let value = test_response.json_value().unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let test_response = TestResponse::from_http(response(StatusCode::OK, "plain"))
            .await
            .unwrap();
        assert!(matches!(
            test_response.json_value(),
            Err(TestError::Json(_))
        ));
    }
}
