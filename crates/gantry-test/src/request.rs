//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use gantry_core::RequestContext;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;

/// A test request ready to dispatch into a pipeline.
pub struct TestRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URI (path and optional query).
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Bytes,
}

impl TestRequest {
    /// Creates a new GET request builder.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request builder.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request builder.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request builder.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request builder.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts this request into the context the pipeline dispatches.
    #[must_use]
    pub fn into_context(self) -> RequestContext {
        RequestContext::from_parts(self.method, &self.uri, self.headers, self.body)
    }
}

/// Builder for constructing test requests.
#[must_use]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: None,
            error: None,
        }
    }

    /// Sets a header on the request.
    ///
    /// An invalid name or value is reported when the request is built.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                self.error = Some(TestError::InvalidHeader(format!(
                    "{}: {}",
                    name.as_ref(),
                    value.as_ref()
                )));
            }
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the request body as JSON and the matching Content-Type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.body = Some(Bytes::from(body));
                self.content_type("application/json")
            }
            Err(e) => {
                self.error = Some(TestError::Json(e));
                self
            }
        }
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns the first builder error, or a build error when the URI does
    /// not parse.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid uri '{}': {e}", self.uri)))?;

        Ok(TestRequest {
            method: self.method,
            uri,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_headers_and_body() {
        let request = TestRequest::post("/widgets")
            .header("X-Tenant", "acme")
            .body("payload")
            .build()
            .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.uri.path(), "/widgets");
        assert_eq!(request.headers.get("X-Tenant").unwrap(), "acme");
        assert_eq!(&request.body[..], b"payload");
    }

    #[test]
    fn json_sets_content_type() {
        let request = TestRequest::post("/widgets")
            .json(&serde_json::json!({"name": "sprocket"}))
            .build()
            .unwrap();

        assert_eq!(
            request.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(&request.body[..], br#"{"name":"sprocket"}"#);
    }

    #[test]
    fn bearer_token_formats_authorization() {
        let request = TestRequest::get("/me").bearer_token("t0ken").build().unwrap();
        assert_eq!(
            request.headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer t0ken"
        );
    }

    #[test]
    fn invalid_uri_is_reported_at_build() {
        let result = TestRequest::get("http://[broken").build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[test]
    fn invalid_header_is_reported_at_build() {
        let result = TestRequest::get("/").header("bad\nname", "x").build();
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn into_context_carries_query() {
        let request = TestRequest::get("/search?q=abc").build().unwrap();
        let ctx = request.into_context();
        assert_eq!(ctx.path(), "/search");
        assert_eq!(ctx.query_param("q"), Some("abc"));
    }
}
