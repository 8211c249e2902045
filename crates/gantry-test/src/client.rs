//! Test client dispatching in-memory requests through a pipeline.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use gantry_pipeline::Pipeline;
use http::Method;
use std::sync::Arc;

/// A client for exercising a built [`Pipeline`] without a socket.
///
/// Requests go through the complete chain — guards, interceptors, error
/// handlers, routing — exactly as they would behind the real server, so
/// tests observe the same short-circuits and problem responses.
///
/// # Example
///
/// ```rust
/// use gantry_core::di::Container;
/// use gantry_pipeline::{endpoint, Pipeline};
/// use gantry_test::TestClient;
/// use http::Method;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pipeline = Pipeline::builder()
///     .add_endpoint(Method::GET, "/ping", endpoint::from_fn(|_| "pong"))
///     .build(&Container::new())
///     .unwrap();
///
/// let client = TestClient::new(pipeline);
/// let response = client.get("/ping").send().await;
/// assert_eq!(response.status_code(), 200);
/// # }
/// ```
#[must_use]
pub struct TestClient {
    pipeline: Arc<Pipeline>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client around a pipeline.
    pub fn new(pipeline: impl Into<Arc<Pipeline>>) -> Self {
        Self {
            pipeline: pipeline.into(),
            default_headers: Vec::new(),
        }
    }

    /// Adds a header included in every request sent by this client.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Creates a request builder with an arbitrary method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    async fn send_internal(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let mut ctx = request.into_context();
        match self.pipeline.dispatch(&mut ctx).await {
            Ok(response) => TestResponse::from_http(response).await,
            Err(error) => Err(TestError::Pipeline(error)),
        }
    }
}

impl From<Pipeline> for TestClient {
    fn from(pipeline: Pipeline) -> Self {
        Self::new(pipeline)
    }
}

/// A request builder bound to a test client.
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let mut builder = builder;
        for (name, value) in &client.default_headers {
            builder = builder.header(name, value);
        }
        Self { client, builder }
    }

    /// Sets a header on the request.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    #[must_use]
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    #[must_use]
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request, panicking on client or unhandled pipeline
    /// errors.
    ///
    /// # Panics
    ///
    /// Panics when the request cannot be built or the pipeline returns an
    /// unhandled error; use [`TestClientRequest::try_send`] to observe
    /// those instead.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should succeed")
    }

    /// Sends the request, surfacing build and pipeline errors.
    ///
    /// An unhandled pipeline error arrives as [`TestError::Pipeline`] —
    /// exactly what the server's caller would observe.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        self.client.send_internal(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::di::Container;
    use gantry_core::RequestContext;
    use gantry_pipeline::{endpoint, guard};

    fn pipeline() -> Pipeline {
        Pipeline::builder()
            .add_endpoint(Method::GET, "/echo", endpoint::from_fn(echo_header))
            .add_endpoint(
                Method::POST,
                "/widgets",
                endpoint::from_try_fn(|ctx: &mut RequestContext| {
                    let body: serde_json::Value = ctx.json_body()?;
                    Ok(gantry_pipeline::Reply::json_value(body)
                        .with_status(http::StatusCode::CREATED))
                }),
            )
            .build(&Container::new())
            .expect("test pipeline builds")
    }

    fn echo_header(ctx: &mut RequestContext) -> String {
        ctx.header("X-Echo").unwrap_or("missing").to_string()
    }

    #[tokio::test]
    async fn get_with_headers() {
        let client = TestClient::new(pipeline());
        let response = client.get("/echo").header("X-Echo", "hi").send().await;

        response.assert_status(200);
        assert_eq!(response.text().unwrap(), "hi");
    }

    #[tokio::test]
    async fn default_headers_apply() {
        let client = TestClient::new(pipeline()).with_default_header("X-Echo", "default");
        let response = client.get("/echo").send().await;
        assert_eq!(response.text().unwrap(), "default");
    }

    #[tokio::test]
    async fn json_round_trip() {
        let client = TestClient::new(pipeline());
        let response = client
            .post("/widgets")
            .json(&serde_json::json!({"name": "sprocket"}))
            .send()
            .await;

        response.assert_status(201);
        let body = response.json_value().unwrap();
        assert_eq!(body["name"], "sprocket");
    }

    #[tokio::test]
    async fn unknown_route_is_404_problem() {
        let client = TestClient::new(pipeline());
        let response = client.get("/nope").send().await;

        response.assert_status(404);
        assert_eq!(
            response.header("content-type"),
            Some("application/problem+json")
        );
    }

    #[tokio::test]
    async fn guard_denial_is_visible_to_tests() {
        let denied = Pipeline::builder()
            .add_guard(guard::from_fn(|_| false))
            .add_endpoint(Method::GET, "/secret", endpoint::from_fn(|_| "hidden"))
            .build(&Container::new())
            .unwrap();

        let client = TestClient::new(denied);
        let response = client.get("/secret").send().await;
        response.assert_status(401);
    }

    #[tokio::test]
    async fn unhandled_error_surfaces_through_try_send() {
        let failing = Pipeline::builder()
            .add_endpoint(
                Method::GET,
                "/boom",
                endpoint::from_try_fn(|_| {
                    Err(gantry_core::GantryError::internal("kaboom"))
                }),
            )
            .build(&Container::new())
            .unwrap();

        let client = TestClient::new(failing);
        let err = client.get("/boom").try_send().await.unwrap_err();
        assert!(matches!(err, TestError::Pipeline(_)));
        assert!(err.to_string().contains("kaboom"));
    }
}
