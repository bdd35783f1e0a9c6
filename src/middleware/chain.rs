//! Chain composition.

use std::fmt;
use std::sync::Arc;

use crate::handler::{BoxedHandler, ErasedHandler, Handler, private};
use crate::middleware::{Interceptor, Next};
use crate::request::Request;
use crate::response::ResponseWriter;

/// An ordered list of interceptors.
///
/// Insertion order is execution order for pre-work and the reverse for
/// post-work. Interceptors are held behind `Arc`, so one chain can be composed
/// around several terminals and the results share the same interceptor
/// instances (and whatever state those carry).
#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor. Returns `self` for chaining.
    pub fn with(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an interceptor that is already shared with another chain.
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Wraps `terminal` in every interceptor of this chain.
    ///
    /// Built innermost-first: the last interceptor wraps the terminal, the one
    /// before wraps that, and so on. Nothing is invoked while building. With an
    /// empty chain the result is the terminal itself.
    pub fn compose(&self, terminal: impl Handler) -> Composed {
        let handler = self
            .interceptors
            .iter()
            .rev()
            .fold(terminal.into_boxed_handler(), |inner, interceptor| {
                Arc::new(Intercepted { interceptor: Arc::clone(interceptor), inner }) as BoxedHandler
            });

        Composed { handler, stages: self.interceptors.len() }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.interceptors.len()).finish()
    }
}

/// One interceptor bound to the already-built rest of the pipeline.
struct Intercepted {
    interceptor: Arc<dyn Interceptor>,
    inner: BoxedHandler,
}

impl ErasedHandler for Intercepted {
    fn call(&self, w: &mut ResponseWriter, req: &mut Request) {
        self.interceptor.intercept(w, req, Next::new(&*self.inner));
    }
}

/// The single handler produced by [`Chain::compose`].
///
/// Immutable and cheap to clone: clones share the same pipeline. Holds no
/// per-request data, so one instance serves any number of concurrent requests.
#[derive(Clone)]
pub struct Composed {
    handler: BoxedHandler,
    stages: usize,
}

impl Composed {
    /// Runs the pipeline for one request.
    ///
    /// Panics raised by any stage propagate out of this call unchanged.
    pub fn call(&self, w: &mut ResponseWriter, req: &mut Request) {
        self.handler.call(w, req);
    }

    /// Number of interceptors wrapped around the terminal.
    pub fn stages(&self) -> usize {
        self.stages
    }
}

impl fmt::Debug for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composed").field("stages", &self.stages).finish()
    }
}

impl private::Sealed for Composed {}

impl Handler for Composed {
    fn into_boxed_handler(self) -> BoxedHandler {
        self.handler
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;

    use super::*;
    use crate::middleware::from_fn;

    #[test]
    fn compose_does_not_invoke_anything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c1 = Arc::clone(&calls);
        let c2 = Arc::clone(&calls);

        let composed = Chain::new()
            .with(from_fn(move |w, req, next| {
                c1.fetch_add(1, Ordering::SeqCst);
                next.run(w, req);
            }))
            .compose(move |_w: &mut ResponseWriter, _req: &mut Request| {
                c2.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        composed.call(&mut ResponseWriter::new(), &mut Request::builder().build());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn composed_can_be_wrapped_again() {
        let inner = Chain::new()
            .with(from_fn(|w, req, next| {
                w.write("inner-pre ");
                next.run(w, req);
            }))
            .compose(|w: &mut ResponseWriter, _req: &mut Request| w.write("terminal "));

        let outer = Chain::new()
            .with(from_fn(|w, req, next| {
                w.write("outer-pre ");
                next.run(w, req);
                w.write("outer-post");
            }))
            .compose(inner);

        let mut w = ResponseWriter::new();
        outer.call(&mut w, &mut Request::builder().build());
        assert_eq!(w.body(), b"outer-pre inner-pre terminal outer-post");
        assert_eq!(outer.stages(), 1);
    }

    #[test]
    fn post_work_sees_downstream_status() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&seen);

        let composed = Chain::new()
            .with(from_fn(move |w, req, next| {
                next.run(w, req);
                s.store(usize::from(w.status().as_u16()), Ordering::SeqCst);
            }))
            .compose(|w: &mut ResponseWriter, _req: &mut Request| {
                w.set_status(StatusCode::NOT_FOUND);
            });

        composed.call(&mut ResponseWriter::new(), &mut Request::builder().build());
        assert_eq!(seen.load(Ordering::SeqCst), 404);
    }

    #[test]
    fn one_chain_composes_around_many_terminals() {
        let chain = Chain::new().with(from_fn(|w, req, next| {
            w.write("[");
            next.run(w, req);
            w.write("]");
        }));
        let a = chain.compose(|w: &mut ResponseWriter, _req: &mut Request| w.write("a"));
        let b = chain.compose(|w: &mut ResponseWriter, _req: &mut Request| w.write("b"));

        let mut wa = ResponseWriter::new();
        let mut wb = ResponseWriter::new();
        a.call(&mut wa, &mut Request::builder().build());
        b.call(&mut wb, &mut Request::builder().build());
        assert_eq!(wa.body(), b"[a]");
        assert_eq!(wb.body(), b"[b]");
        assert_eq!((a.stages(), b.stages()), (1, 1));
    }
}
