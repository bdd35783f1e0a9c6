//! Radix-tree request router.
//!
//! One tree, keyed by path. O(path-length) lookup. You register a path, you
//! get a handler; anything else goes to the fallback, or gets a 404.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: MatchitRouter<BoxedHandler>,
    fallback: Option<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: MatchitRouter::new(), fallback: None }
    }

    /// Register a handler for a path. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, `{*name}` for a catch-all tail.
    /// Every method is routed to the same handler.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an earlier route, so a
    /// broken routing table never starts serving.
    ///
    /// ```rust
    /// # use hdrecho::{Request, ResponseWriter, Router};
    /// # fn get_user(_: &mut ResponseWriter, _: &mut Request) {}
    /// # fn healthz(_: &mut ResponseWriter, _: &mut Request) {}
    /// Router::new()
    ///     .route("/healthz",    healthz)
    ///     .route("/users/{id}", get_user);
    /// ```
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Handler for every path no route matches. Replaces any earlier fallback.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Some(handler.into_boxed_handler());
        self
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        match self.routes.at(path) {
            Ok(matched) => {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                Some((Arc::clone(matched.value), params))
            }
            Err(_) => self.fallback.as_ref().map(|h| (Arc::clone(h), HashMap::new())),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("fallback", &self.fallback.is_some())
            .finish_non_exhaustive()
    }
}
