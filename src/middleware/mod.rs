//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: client-address resolution, status logging,
//! per-request tracing spans.
//!
//! An [`Interceptor`] receives the response sink, the request and a [`Next`]
//! continuation for the rest of the pipeline. A [`Chain`] is an ordered list
//! of interceptors; [`Chain::compose`] wraps it around a terminal handler and
//! returns a single [`Composed`] handler:
//!
//! ```text
//! Chain [a, b] + terminal t
//!
//!   a ── pre ──▶ b ── pre ──▶ t
//!                             │
//!   a ◀─ post ── b ◀─ post ───┘
//! ```
//!
//! ```rust
//! use hdrecho::middleware::{self, Chain, ClientIp, StatusLog};
//! use hdrecho::{Request, ResponseWriter};
//!
//! fn root(w: &mut ResponseWriter, _req: &mut Request) {
//!     w.write("hello\n");
//! }
//!
//! let app = Chain::new()
//!     .with(ClientIp)
//!     .with(StatusLog)
//!     .with(middleware::from_fn(|w, req, next| {
//!         if req.header("x-block").is_some() {
//!             w.set_status(http::StatusCode::FORBIDDEN);
//!             return;
//!         }
//!         next.run(w, req);
//!     }))
//!     .compose(root);
//!
//! let mut w = ResponseWriter::new();
//! app.call(&mut w, &mut Request::builder().build());
//! assert_eq!(w.body(), b"hello\n");
//! ```

mod chain;
mod client_ip;
mod status_log;
mod trace;

pub use chain::{Chain, Composed};
pub use client_ip::{ClientAddr, ClientIp, client_ip};
pub use status_log::StatusLog;
pub use trace::Trace;

use crate::handler::ErasedHandler;
use crate::request::Request;
use crate::response::ResponseWriter;

/// One stage of a pipeline.
///
/// Do pre-work, call [`next.run`](Next::run) to hand the request to the rest
/// of the chain, then do post-work. Anything downstream wrote to the sink is
/// visible once `run` returns. Returning without calling `run` short-circuits:
/// no later stage executes, but outer stages still get their post-work.
///
/// State an interceptor carries across requests lives in its own fields and is
/// shared by every concurrent request, so it must synchronise itself.
pub trait Interceptor: Send + Sync + 'static {
    fn intercept(&self, w: &mut ResponseWriter, req: &mut Request, next: Next<'_>);
}

/// Continuation for the remainder of the pipeline.
///
/// Borrowed from the composed handler, so handing one out costs nothing per
/// request. `run` takes `self` by value: a stage can continue the chain at
/// most once, and a second call does not compile.
pub struct Next<'a> {
    inner: &'a (dyn ErasedHandler + Send + Sync),
}

impl<'a> Next<'a> {
    pub(crate) fn new(inner: &'a (dyn ErasedHandler + Send + Sync)) -> Self {
        Self { inner }
    }

    /// Runs every later stage, ending with the terminal handler.
    ///
    /// Consumes the continuation, so continuing twice is rejected:
    ///
    /// ```compile_fail
    /// use hdrecho::middleware;
    ///
    /// let twice = middleware::from_fn(|w, req, next| {
    ///     next.run(w, req);
    ///     next.run(w, req);
    /// });
    /// # let _ = twice;
    /// ```
    pub fn run(self, w: &mut ResponseWriter, req: &mut Request) {
        self.inner.call(w, req);
    }
}

/// Turns a closure into an [`Interceptor`].
///
/// ```rust
/// use hdrecho::middleware;
///
/// let stamp = middleware::from_fn(|w, req, next| {
///     next.run(w, req);
///     w.headers_mut().insert("x-served-by", http::HeaderValue::from_static("hdrecho"));
/// });
/// # let _ = stamp;
/// ```
pub fn from_fn<F>(f: F) -> FnInterceptor<F>
where
    F: Fn(&mut ResponseWriter, &mut Request, Next<'_>) + Send + Sync + 'static,
{
    FnInterceptor(f)
}

/// Interceptor backed by a closure. Built by [`from_fn`].
pub struct FnInterceptor<F>(F);

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut ResponseWriter, &mut Request, Next<'_>) + Send + Sync + 'static,
{
    fn intercept(&self, w: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        (self.0)(w, req, next);
    }
}
