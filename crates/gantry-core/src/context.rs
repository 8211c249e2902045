//! Per-request context.
//!
//! The [`RequestContext`] is the one mutable aggregate threaded through
//! every pipeline step. It is created when a request arrives, enriched by
//! steps as they run (identity, route parameters, extensions), marked
//! responded once the pipeline has produced a response, and dropped with
//! the request. A context is owned by exactly one request and never shared.

use crate::identity::Principal;
use crate::{GantryError, GantryResult};
use bytes::Bytes;
use gantry_router::Params;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a fresh request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID, e.g. one propagated from an upstream proxy.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The per-request aggregate threaded through the pipeline.
///
/// Holds the parsed request (method, path, headers, query, body), the route
/// parameters filled in after routing, the caller [`Principal`], and a
/// type-keyed extension map for anything steps want to hand each other.
///
/// # Lifecycle
///
/// created → mutated (by steps) → responded → dropped. The responded flag
/// is one-way; a step that runs after it is set is a defect in the calling
/// code, and the context makes no attempt to recover from it.
///
/// # Example
///
/// ```rust
/// use gantry_core::RequestContext;
///
/// let mut ctx = RequestContext::mock();
/// ctx.principal_mut().authenticate();
///
/// assert!(ctx.principal().is_authenticated());
/// assert!(!ctx.is_responded());
/// ```
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    params: Params,
    body: Bytes,
    principal: Principal,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    started_at: Instant,
    responded: bool,
}

impl RequestContext {
    /// Creates a context from the parsed parts of an inbound request.
    ///
    /// The query string is decoded here, once; route parameters are filled
    /// in later by the pipeline after the route has matched.
    #[must_use]
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: uri.path().to_string(),
            headers,
            query: parse_query(uri.query()),
            params: Params::new(),
            body,
            principal: Principal::anonymous(),
            extensions: HashMap::new(),
            started_at: Instant::now(),
            responded: false,
        }
    }

    /// Creates an empty `GET /` context for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::from_parts(Method::GET, &Uri::from_static("/"), HeaderMap::new(), Bytes::new())
    }

    /// Returns the request id.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request id, e.g. with one propagated by a client.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns all request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the decoded query parameters.
    #[must_use]
    pub const fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns a single query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns the route parameters captured by the router.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single route parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Installs the route parameters after the route has matched.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Returns the raw request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the body is not valid JSON for `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> GantryResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| GantryError::validation(format!("invalid JSON body: {e}")))
    }

    /// Returns the caller principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the caller principal for mutation.
    pub fn principal_mut(&mut self) -> &mut Principal {
        &mut self.principal
    }

    /// Stores a typed extension value.
    ///
    /// Extensions let steps hand arbitrary data to later steps without the
    /// context knowing its shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gantry_core::RequestContext;
    ///
    /// struct Tenant(&'static str);
    ///
    /// let mut ctx = RequestContext::mock();
    /// ctx.set_extension(Tenant("acme"));
    /// assert_eq!(ctx.get_extension::<Tenant>().unwrap().0, "acme");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks whether an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Returns when the request started processing.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request arrived.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Marks the context as responded. One-way.
    pub fn mark_responded(&mut self) {
        self.responded = true;
    }

    /// Returns `true` once a response has been produced for this request.
    #[must_use]
    pub const fn is_responded(&self) -> bool {
        self.responded
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Extensions are type-erased; report only how many there are.
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("principal", &self.principal)
            .field("params", &self.params)
            .field("extension_count", &self.extensions.len())
            .field("responded", &self.responded)
            .finish()
    }
}

/// Decodes an `application/x-www-form-urlencoded` query string.
///
/// Later duplicates of a key overwrite earlier ones; keys without `=` map
/// to an empty value.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(query) = query else {
        return out;
    };
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(raw_key);
        let value = decode_component(raw_value);
        out.insert(key, value);
    }
    out
}

fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|c| c.into_owned())
        .unwrap_or(plus_decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn from_parts_parses_path_and_query() {
        let uri: Uri = "/search?q=hello+world&page=2&flag".parse().unwrap();
        let ctx = RequestContext::from_parts(Method::GET, &uri, HeaderMap::new(), Bytes::new());

        assert_eq!(ctx.path(), "/search");
        assert_eq!(ctx.query_param("q"), Some("hello world"));
        assert_eq!(ctx.query_param("page"), Some("2"));
        assert_eq!(ctx.query_param("flag"), Some(""));
        assert_eq!(ctx.query_param("missing"), None);
    }

    #[test]
    fn percent_decoding() {
        let uri: Uri = "/x?name=Jos%C3%A9".parse().unwrap();
        let ctx = RequestContext::from_parts(Method::GET, &uri, HeaderMap::new(), Bytes::new());
        assert_eq!(ctx.query_param("name"), Some("José"));
    }

    #[test]
    fn json_body_deserializes() {
        #[derive(Deserialize)]
        struct Payload {
            name: String,
        }

        let uri = Uri::from_static("/users");
        let body = Bytes::from(r#"{"name":"alice"}"#);
        let ctx = RequestContext::from_parts(Method::POST, &uri, HeaderMap::new(), body);

        let payload: Payload = ctx.json_body().unwrap();
        assert_eq!(payload.name, "alice");
    }

    #[test]
    fn json_body_rejects_garbage() {
        let uri = Uri::from_static("/users");
        let ctx = RequestContext::from_parts(
            Method::POST,
            &uri,
            HeaderMap::new(),
            Bytes::from_static(b"not json"),
        );

        let result: GantryResult<serde_json::Value> = ctx.json_body();
        assert!(result.is_err());
    }

    #[test]
    fn params_install() {
        let mut ctx = RequestContext::mock();
        let mut params = Params::new();
        params.push("id", "7");
        ctx.set_params(params);

        assert_eq!(ctx.param("id"), Some("7"));
    }

    #[test]
    fn extensions() {
        #[derive(Debug, PartialEq)]
        struct Marker(u32);

        let mut ctx = RequestContext::mock();
        assert!(!ctx.has_extension::<Marker>());

        ctx.set_extension(Marker(42));
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(42)));

        assert_eq!(ctx.remove_extension::<Marker>(), Some(Marker(42)));
        assert!(!ctx.has_extension::<Marker>());
    }

    #[test]
    fn responded_flag_is_one_way() {
        let mut ctx = RequestContext::mock();
        assert!(!ctx.is_responded());
        ctx.mark_responded();
        assert!(ctx.is_responded());
    }
}
