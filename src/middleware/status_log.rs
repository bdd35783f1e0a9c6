use tracing::info;

use crate::middleware::{Interceptor, Next};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Logs the response status once the rest of the pipeline has run.
///
/// `implicit` is true when no stage set a status and the `200 OK` default
/// is what gets sent.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusLog;

impl Interceptor for StatusLog {
    fn intercept(&self, w: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        next.run(w, req);
        info!(
            status = w.status().as_u16(),
            implicit = !w.status_set(),
            path = %req.path(),
            "response status"
        );
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use tracing_test::traced_test;

    use super::*;
    use crate::middleware::Chain;

    #[test]
    #[traced_test]
    fn logs_status_written_downstream() {
        let handler = Chain::new()
            .with(StatusLog)
            .compose(|w: &mut ResponseWriter, _req: &mut Request| {
                w.set_status(StatusCode::SERVICE_UNAVAILABLE);
            });

        handler.call(&mut ResponseWriter::new(), &mut Request::builder().path("/down").build());
        assert!(logs_contain("status=503"));
        assert!(logs_contain("path=/down"));
        assert!(logs_contain("implicit=false"));
    }

    #[test]
    #[traced_test]
    fn logs_default_ok() {
        let handler = Chain::new()
            .with(StatusLog)
            .compose(|w: &mut ResponseWriter, _req: &mut Request| w.write("fine"));

        handler.call(&mut ResponseWriter::new(), &mut Request::builder().build());
        assert!(logs_contain("status=200"));
        assert!(logs_contain("implicit=true"));
    }
}
