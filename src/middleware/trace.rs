//! Per-request span with method, path, status and latency.

use std::time::Instant;

use tracing::{debug, info_span};

use crate::middleware::{Interceptor, Next};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Opens a `request` span around the rest of the pipeline.
///
/// Every event logged by later stages is recorded inside the span, so put
/// `Trace` first in a chain to give the whole request one span.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Interceptor for Trace {
    fn intercept(&self, w: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        let span = info_span!("request", method = %req.method(), path = %req.path());
        let _entered = span.enter();
        let start = Instant::now();

        next.run(w, req);

        debug!(
            status = w.status().as_u16(),
            latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "request finished"
        );
    }
}
