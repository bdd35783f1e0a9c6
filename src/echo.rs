//! Header echo handler.
//!
//! Answers every request with a plain-text dump of its headers followed by
//! the configured version string:
//!
//! ```text
//! ===================Details of the http request header:============
//! accept     = [*/*]
//! host       = [localhost:8080]
//! user-agent = [curl/8.5.0]
//! Version = v1.2.0
//! ```
//!
//! Names are lowercase (as hyper normalises them), sorted, and padded to the
//! longest name. Repeated headers list every value in arrival order.

use http::header::{CONTENT_TYPE, HeaderValue};

use crate::handler::Handler;
use crate::request::Request;
use crate::response::{ResponseWriter, TEXT_PLAIN};

const BANNER: &str = "===================Details of the http request header:============\n";

/// Builds the echo handler reporting `version`.
pub fn headers(version: impl Into<String>) -> impl Handler {
    let version = version.into();
    move |w: &mut ResponseWriter, req: &mut Request| write_details(w, req, &version)
}

fn write_details(w: &mut ResponseWriter, req: &Request, version: &str) {
    w.set_header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    w.write(BANNER);

    let mut names: Vec<&str> = req.headers().keys().map(|k| k.as_str()).collect();
    names.sort_unstable();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    for name in names {
        let values = req
            .headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect::<Vec<_>>()
            .join(" ");
        w.write(format!("{name:<width$} = [{values}]\n"));
    }

    w.write(format!("Version = {version}\n"));
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::handler::ErasedHandler;

    fn render(req: Request, version: &str) -> (StatusCode, String) {
        let handler = headers(version).into_boxed_handler();
        let mut w = ResponseWriter::new();
        let mut req = req;
        handler.call(&mut w, &mut req);
        (w.status(), String::from_utf8(w.body().to_vec()).unwrap())
    }

    #[test]
    fn aligns_sorted_header_names() {
        let req = Request::builder()
            .header("user-agent", "curl/8.5.0")
            .header("host", "localhost")
            .header("accept", "*/*")
            .build();

        let (status, body) = render(req, "v1");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "===================Details of the http request header:============\n\
             accept     = [*/*]\n\
             host       = [localhost]\n\
             user-agent = [curl/8.5.0]\n\
             Version = v1\n"
        );
    }

    #[test]
    fn repeated_header_lists_every_value() {
        let req = Request::builder()
            .header("x-tag", "a")
            .header("x-tag", "b")
            .build();

        let (_, body) = render(req, "");
        assert!(body.contains("x-tag = [a b]\n"), "{body}");
    }

    #[test]
    fn no_headers_still_reports_version() {
        let (_, body) = render(Request::builder().build(), "2.0.1");
        assert_eq!(body, format!("{BANNER}Version = 2.0.1\n"));
    }

    #[test]
    fn empty_version() {
        let (_, body) = render(Request::builder().build(), "");
        assert!(body.ends_with("Version = \n"));
    }
}
