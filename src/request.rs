//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Uri};

/// An incoming HTTP request with its body fully read.
///
/// [`path`](Request::path) is the path the router matches against. It starts
/// out equal to the URI path and is rewritten when the request crosses an
/// [`embed`](crate::Router::embed) boundary; [`uri`](Request::uri) always
/// keeps what the client sent.
pub struct Request {
    pub(crate) method: http::Method,
    pub(crate) uri: Uri,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) pattern: Option<Arc<str>>,
    // Remainder below a subtree match, consumed by an embedded mount.
    pub(crate) subtree: Option<String>,
}

impl Request {
    pub fn method(&self) -> &str { self.method.as_str() }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The registered pattern that matched this request, e.g. `/users/{id}`.
    ///
    /// `None` until a router has resolved the request. Behind an embedded
    /// router this is the innermost match.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Method and routing path, detached from the request so they survive
    /// handing the request to the next handler.
    pub fn line(&self) -> RequestLine {
        RequestLine { method: self.method.clone(), path: self.path.clone() }
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();
        Self {
            method: parts.method,
            uri: parts.uri,
            path,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            pattern: None,
            subtree: None,
        }
    }
}

/// The method and path of a request, see [`Request::line`].
#[derive(Clone, Debug)]
pub struct RequestLine {
    method: http::Method,
    path: String,
}

impl RequestLine {
    pub fn method(&self) -> &str { self.method.as_str() }
    pub fn path(&self) -> &str { &self.path }
}
