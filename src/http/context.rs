//! Per-request context.
//!
//! # Responsibilities
//! - Carry method, path, path base and route params through the pipeline
//! - Expose the request body as a forward-only, size-limited stream
//! - Collect status, headers and an append-only output body
//!
//! # Design Decisions
//! - One `Context` per request, owned by the request task and passed by `&mut`
//! - Response fields are last-write-wins; nothing is sent until the pipeline returns
//! - Body reads are bounded by a configured limit before anything is buffered past it

use std::str::FromStr;
use std::string::FromUtf8Error;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Method, Request, StatusCode};
use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::http::request::X_REQUEST_ID;
use crate::routing::pattern::Params;

/// Default request body limit (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Errors raised while reading the request body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The transport failed or the client went away mid-read.
    #[error("request body could not be read: {0}")]
    Cancelled(#[source] axum::Error),

    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request body is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Forward-only request body. Can be consumed once.
#[derive(Debug)]
pub struct RequestBody {
    inner: Option<Body>,
    limit: usize,
}

impl RequestBody {
    pub fn new(body: Body, limit: usize) -> Self {
        Self {
            inner: Some(body),
            limit,
        }
    }

    pub fn empty() -> Self {
        Self {
            inner: None,
            limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Read the whole body. A second call returns an empty buffer.
    pub async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        let Some(mut body) = self.inner.take() else {
            return Ok(Bytes::new());
        };

        let mut buf = BytesMut::new();
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(BodyError::Cancelled)?;
            // Trailers are ignored.
            if let Ok(data) = frame.into_data() {
                if buf.len() + data.len() > self.limit {
                    return Err(BodyError::TooLarge { limit: self.limit });
                }
                buf.extend_from_slice(&data);
            }
        }

        Ok(buf.freeze())
    }

    pub async fn text(&mut self) -> Result<String, BodyError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Append-only response body.
#[derive(Debug, Default)]
pub struct ResponseBody {
    buf: BytesMut,
}

impl ResponseBody {
    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.buf.extend_from_slice(data.as_ref());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Mutable per-request state shared by middleware and handlers.
#[derive(Debug)]
pub struct Context {
    method: Method,
    path: String,
    path_base: String,
    params: Params,
    request_headers: HeaderMap,
    request_id: Option<String>,
    route: Option<Arc<str>>,
    body: RequestBody,
    status: StatusCode,
    response_headers: HeaderMap,
    output: ResponseBody,
}

impl Context {
    /// Context with no headers and an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_base: String::new(),
            params: Params::new(),
            request_headers: HeaderMap::new(),
            request_id: None,
            route: None,
            body: RequestBody::empty(),
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            output: ResponseBody::default(),
        }
    }

    /// Build a context from an incoming request, bounding body reads to `body_limit`.
    pub fn from_request(request: Request<Body>, body_limit: usize) -> Self {
        let (parts, body) = request.into_parts();
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut ctx = Self::new(parts.method, decode_path(parts.uri.path()));
        ctx.request_headers = parts.headers;
        ctx.request_id = request_id;
        ctx.body = RequestBody::new(body, body_limit);
        ctx
    }

    pub fn with_body(mut self, body: impl Into<Body>, limit: usize) -> Self {
        self.body = RequestBody::new(body.into(), limit);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.request_headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the current mount point.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Prefixes stripped by enclosing mounts, outermost first.
    pub fn path_base(&self) -> &str {
        &self.path_base
    }

    pub fn full_path(&self) -> String {
        format!("{}{}", self.path_base, self.path)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parse a route param. `None` if absent or unparsable.
    pub fn param_as<T: FromStr>(&self, name: &str) -> Option<T> {
        self.param(name).and_then(|v| v.parse().ok())
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Display name of the matched route, once dispatched.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn body_mut(&mut self) -> &mut RequestBody {
        &mut self.body
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn output(&self) -> &ResponseBody {
        &self.output
    }

    pub fn write(&mut self, data: impl AsRef<[u8]>) {
        self.output.write(data);
    }

    /// Append text, defaulting the content type to plain text.
    pub fn write_text(&mut self, text: impl AsRef<str>) {
        if !self.response_headers.contains_key(header::CONTENT_TYPE) {
            self.response_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        self.output.write(text.as_ref());
    }

    pub fn write_html(&mut self, html: impl AsRef<str>) {
        self.response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        self.output.write(html.as_ref());
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_vec(value)?;
        self.response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.output.write(encoded);
        Ok(())
    }

    pub(crate) fn replace_path(&mut self, path: String) -> String {
        std::mem::replace(&mut self.path, path)
    }

    pub(crate) fn replace_path_base(&mut self, path_base: String) -> String {
        std::mem::replace(&mut self.path_base, path_base)
    }

    pub(crate) fn replace_params(&mut self, params: Params) -> Params {
        std::mem::replace(&mut self.params, params)
    }

    pub(crate) fn set_route(&mut self, route: Arc<str>) {
        self.route = Some(route);
    }

    pub(crate) fn route_handle(&self) -> Option<Arc<str>> {
        self.route.clone()
    }

    pub(crate) fn replace_route(&mut self, route: Option<Arc<str>>) -> Option<Arc<str>> {
        std::mem::replace(&mut self.route, route)
    }

    pub(crate) fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.response_headers, self.output.into_bytes())
    }
}

/// Percent-decode each path segment. An encoded `/` stays `%2F` so it
/// cannot split a segment; segments that do not decode to UTF-8 are kept raw.
pub fn decode_path(raw: &str) -> String {
    raw.split('/')
        .map(|segment| match percent_decode_str(segment).decode_utf8() {
            Ok(decoded) => decoded.replace('/', "%2F"),
            Err(_) => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_body_is_forward_only() {
        let mut ctx = Context::new(Method::POST, "/B").with_body("hello", 1024);
        assert!(!ctx.body_mut().is_consumed());
        assert_eq!(ctx.body_mut().text().await.unwrap(), "hello");
        assert!(ctx.body_mut().is_consumed());
        assert_eq!(ctx.body_mut().bytes().await.unwrap(), Bytes::new());
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut ctx = Context::new(Method::POST, "/B").with_body("0123456789", 4);
        let err = ctx.body_mut().bytes().await.unwrap_err();
        assert!(matches!(err, BodyError::TooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn test_body_decoding_errors() {
        let mut ctx = Context::new(Method::POST, "/A").with_body("{not json", 1024);
        let err = ctx.body_mut().json::<serde_json::Value>().await.unwrap_err();
        assert!(matches!(err, BodyError::Json(_)));

        let mut ctx = Context::new(Method::POST, "/B").with_body(vec![0xff, 0xfe], 1024);
        let err = ctx.body_mut().text().await.unwrap_err();
        assert!(matches!(err, BodyError::Utf8(_)));
    }

    #[test]
    fn test_from_request_reads_request_id() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/customers/3?verbose=1")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();

        let ctx = Context::from_request(request, DEFAULT_BODY_LIMIT);
        assert_eq!(ctx.method(), Method::GET);
        assert_eq!(ctx.path(), "/customers/3");
        assert_eq!(ctx.request_id(), Some("abc-123"));
        assert_eq!(ctx.status(), StatusCode::OK);
    }

    #[test]
    fn test_params_typed_access() {
        let mut ctx = Context::new(Method::GET, "/customers/42");
        ctx.replace_params(Params::from([("id".to_string(), "42".to_string())]));
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.param_as::<i32>("id"), Some(42));
        assert_eq!(ctx.param_as::<i32>("missing"), None);
    }

    #[test]
    fn test_writes_append_and_content_type() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.write_text("Hel");
        ctx.write_text("lo");
        assert_eq!(ctx.output().as_bytes(), b"Hello");
        assert_eq!(
            ctx.response_headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        ctx.set_status(StatusCode::CREATED);
        ctx.set_status(StatusCode::ACCEPTED);
        assert_eq!(ctx.status(), StatusCode::ACCEPTED);

        let mut ctx = Context::new(Method::GET, "/");
        ctx.write_json(&serde_json::json!({"a": 1})).unwrap();
        ctx.write_text("ignored type");
        assert_eq!(ctx.response_headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_path_is_decoded_per_segment() {
        assert_eq!(decode_path("/customers/%31"), "/customers/1");
        assert_eq!(decode_path("/files/a%20b/c"), "/files/a b/c");
        assert_eq!(decode_path("/files/a%2Fb/c"), "/files/a%2Fb/c");
        assert_eq!(decode_path("/files/%FF/c"), "/files/%FF/c");
        assert_eq!(decode_path("/"), "/");

        let request = Request::builder()
            .uri("/customers/%34%32")
            .body(Body::empty())
            .unwrap();
        let ctx = Context::from_request(request, DEFAULT_BODY_LIMIT);
        assert_eq!(ctx.path(), "/customers/42");
    }

    #[test]
    fn test_full_path() {
        let mut ctx = Context::new(Method::GET, "/x");
        ctx.replace_path_base("/mydashboard".to_string());
        assert_eq!(ctx.full_path(), "/mydashboard/x");
    }
}
