//! The response sink shared by every stage of a pipeline.
//!
//! One [`ResponseWriter`] is created per request by the dispatcher and passed
//! by `&mut` through each interceptor down to the terminal handler. Whatever a
//! stage writes is visible to every stage that looks at the writer afterwards,
//! which is how post-work sees the outcome of downstream stages.
//!
//! The status code is a plain field recorded when [`ResponseWriter::set_status`]
//! is called, so logging it after the fact is a getter call:
//!
//! ```rust
//! use hdrecho::ResponseWriter;
//! use http::StatusCode;
//!
//! let mut w = ResponseWriter::new();
//! w.set_status(StatusCode::NOT_FOUND);
//! assert_eq!(w.status(), StatusCode::NOT_FOUND);
//! ```

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

/// Plain-text content type, set when a body is written without one.
pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A buffered HTTP response under construction.
///
/// Defaults to `200 OK` with no headers and an empty body.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the status code. The last call before the response is sent wins.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// The status recorded so far, `200 OK` if no stage has set one.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// `true` once any stage has called [`set_status`](Self::set_status).
    pub fn status_set(&self) -> bool {
        self.status.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing any previous values under the same name.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Appends bytes to the body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Discards everything written to the body so far.
    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Converts the sink into the hyper response sent on the wire.
    pub(crate) fn into_http(mut self) -> http::Response<Full<Bytes>> {
        if !self.body.is_empty() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        }

        let mut response = http::Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }

    /// A body-less response, used by the dispatcher for 400/404/500.
    pub(crate) fn status_only(status: StatusCode) -> http::Response<Full<Bytes>> {
        let mut w = Self::new();
        w.set_status(status);
        w.into_http()
    }
}
