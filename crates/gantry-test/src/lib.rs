//! # Gantry Test
//!
//! Test utilities for the Gantry framework: in-memory dispatch through a
//! built pipeline, with no network connections or port binding.
//!
//! Requests created here run the complete chain — guards, interceptors,
//! error handlers, routing — so a test observes exactly the responses the
//! real server would send, including problem-details denials, plus any
//! unhandled pipeline error via [`TestClientRequest::try_send`].
//!
//! ## Example
//!
//! ```rust
//! use gantry_core::di::Container;
//! use gantry_pipeline::{endpoint, interceptor, Pipeline};
//! use gantry_test::TestClient;
//! use http::Method;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pipeline = Pipeline::builder()
//!     .add_interceptor(interceptor::from_fn(|ctx| {
//!         ctx.principal_mut().authenticate();
//!     }))
//!     .add_endpoint(Method::GET, "/whoami", endpoint::from_fn(|ctx| {
//!         serde_json::json!({"authenticated": ctx.principal().is_authenticated()})
//!     }))
//!     .build(&Container::new())
//!     .unwrap();
//!
//! let client = TestClient::new(pipeline);
//! let response = client.get("/whoami").send().await;
//!
//! assert_eq!(response.status_code(), 200);
//! assert_eq!(response.json_value().unwrap()["authenticated"], true);
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/gantry-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
