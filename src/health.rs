//! Liveness probe handler.
//!
//! Register it on its own path, outside any middleware chain, so probes
//! neither pay for nor clutter the request logging:
//!
//! ```rust
//! use hdrecho::{Router, health};
//!
//! let app = Router::new().route("/healthz", health::liveness);
//! # let _ = app;
//! ```

use crate::{Request, ResponseWriter};

/// Kubernetes liveness probe handler.
///
/// Always `200 OK` with body `"200\n"`. If the process can respond to HTTP at
/// all, it is alive; this handler has no dependencies.
pub fn liveness(w: &mut ResponseWriter, _req: &mut Request) {
    w.write("200\n");
}
