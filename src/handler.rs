//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! The router and the middleware chain both hold handlers of *different*
//! concrete types side by side, so every handler is erased behind
//! `dyn ErasedHandler` and shared through an `Arc`:
//!
//! ```text
//! fn root(w: &mut ResponseWriter, req: &mut Request) { … }   ← user writes this
//!        ↓ router.route("/", root)
//! root.into_boxed_handler()                                  ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(root))                                  ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(&mut w, &mut req)  at request time            ← one vtable dispatch
//! ```
//!
//! Handlers are synchronous. The response sink is borrowed for the duration of
//! the call and every stage writes into the same one; the dispatcher moves the
//! whole call onto tokio's blocking pool, so a handler that blocks only ties
//! up a blocking thread.

use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, w: &mut ResponseWriter, req: &mut Request);
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid request handler.
///
/// Satisfied by any function or closure with the signature:
///
/// ```text
/// fn name(w: &mut ResponseWriter, req: &mut Request)
/// ```
///
/// and by [`Composed`](crate::middleware::Composed), so a composed pipeline
/// can be registered, or wrapped again, anywhere a plain handler can.
///
/// The trait is **sealed**: only the impls in this crate can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

pub(crate) mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F> private::Sealed for F
where
    F: Fn(&mut ResponseWriter, &mut Request) + Send + Sync + 'static,
{
}

impl<F> Handler for F
where
    F: Fn(&mut ResponseWriter, &mut Request) + Send + Sync + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype that bridges a concrete `Fn` to the trait-object world.
struct FnHandler<F>(F);

impl<F> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut ResponseWriter, &mut Request) + Send + Sync,
{
    fn call(&self, w: &mut ResponseWriter, req: &mut Request) {
        (self.0)(w, req);
    }
}
