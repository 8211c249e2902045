//! Common types used throughout the pipeline.

use bytes::Bytes;
use gantry_core::{GantryError, Problem};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

/// The HTTP response type produced by the pipeline.
///
/// A standard `http::Response` with a `Full<Bytes>` body, matching what the
/// hyper server hands back to the wire.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed future, as returned by step trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The result every chain segment produces: a response, or an error for the
/// nearest error handler (or the caller) to deal with.
pub type StepResult = Result<Response, GantryError>;

/// Extension trait for building framework responses.
pub trait ResponseExt {
    /// Creates an `application/problem+json` response from a problem.
    fn problem(problem: &Problem) -> Response;

    /// Creates an empty response with the given status.
    fn empty(status: http::StatusCode) -> Response;
}

impl ResponseExt for Response {
    fn problem(problem: &Problem) -> Response {
        let body = serde_json::to_string(problem)
            .unwrap_or_else(|_| format!(r#"{{"status":{}}}"#, problem.status));

        http::Response::builder()
            .status(problem.status_code())
            .header(http::header::CONTENT_TYPE, "application/problem+json")
            .body(Full::new(Bytes::from(body)))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }

    fn empty(status: http::StatusCode) -> Response {
        http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn problem_response_shape() {
        let problem = Problem::unauthorized().with_instance("/admin");
        let response = Response::problem(&problem);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .unwrap(),
            "application/problem+json"
        );
    }

    #[test]
    fn empty_response() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
