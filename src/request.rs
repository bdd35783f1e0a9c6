//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method};

/// An incoming HTTP request with its body already collected.
///
/// Interceptors receive it by `&mut` and may attach per-request attributes
/// through [`extensions_mut`](Request::extensions_mut).
#[derive(Debug, Default)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) extensions: Extensions,
}

impl Request {
    /// Builder for requests constructed outside the server, mostly in tests.
    pub fn builder() -> RequestBuilder {
        RequestBuilder { inner: Request { path: "/".to_owned(), ..Request::default() } }
    }

    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        params: HashMap<String, String>,
        remote_addr: SocketAddr,
    ) -> Self {
        Self {
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            method: parts.method,
            headers: parts.headers,
            body,
            params,
            remote_addr: Some(remote_addr),
            extensions: parts.extensions,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Address of the connected peer. `None` for requests built by hand.
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// First value of a header, if present and valid UTF-8.
    ///
    /// Lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

/// Fluent builder for [`Request`]. Obtain via [`Request::builder()`].
///
/// Defaults to `GET /` with no headers, no body and no peer address.
pub struct RequestBuilder {
    inner: Request,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.inner.method = method;
        self
    }

    /// Sets the path, splitting off a `?query` suffix if present.
    pub fn path(mut self, path: &str) -> Self {
        match path.split_once('?') {
            Some((p, q)) => {
                self.inner.path = p.to_owned();
                self.inner.query = Some(q.to_owned());
            }
            None => {
                self.inner.path = path.to_owned();
                self.inner.query = None;
            }
        }
        self
    }

    /// Appends a header value. Repeated names keep every value.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header name/value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name)
            .unwrap_or_else(|e| panic!("invalid header name `{name}`: {e}"));
        let value = HeaderValue::try_from(value)
            .unwrap_or_else(|e| panic!("invalid header value `{value}`: {e}"));
        self.inner.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.inner.body = body.into();
        self
    }

    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.inner.remote_addr = Some(addr);
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.inner.params.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn build(self) -> Request {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_splits_query() {
        let req = Request::builder().path("/a/b?x=1&y=2").build();
        assert_eq!(req.path(), "/a/b");
        assert_eq!(req.query(), Some("x=1&y=2"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::builder().header("X-Real-Ip", "10.0.0.1").build();
        assert_eq!(req.header("x-real-ip"), Some("10.0.0.1"));
        assert_eq!(req.header("X-REAL-IP"), Some("10.0.0.1"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn repeated_headers_keep_all_values() {
        let req = Request::builder()
            .header("accept", "text/plain")
            .header("accept", "application/json")
            .build();
        assert_eq!(req.headers().get_all("accept").iter().count(), 2);
    }

    #[test]
    fn from_parts_carries_uri_and_peer() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/echo?v=1")
            .header("host", "example.test")
            .body(())
            .unwrap()
            .into_parts();
        let peer: SocketAddr = "192.0.2.7:5555".parse().unwrap();
        let req = Request::from_parts(parts, Bytes::from_static(b"hi"), HashMap::new(), peer);

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.path(), "/echo");
        assert_eq!(req.query(), Some("v=1"));
        assert_eq!(req.header("host"), Some("example.test"));
        assert_eq!(req.body(), b"hi");
        assert_eq!(req.remote_addr(), Some(peer));
    }
}
