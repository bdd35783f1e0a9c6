//! Client address resolution.
//!
//! Behind a reverse proxy the peer address is the proxy's, so the forwarding
//! headers it sets are consulted first:
//!
//! 1. first entry of `X-Forwarded-For`
//! 2. `X-Real-Ip`
//! 3. the peer socket address
//! 4. `"unknown"`

use std::borrow::Cow;

use tracing::info;

use crate::middleware::{Interceptor, Next};
use crate::request::Request;
use crate::response::ResponseWriter;

/// The resolved client address, stored in the request extensions by
/// [`ClientIp`] for later stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientAddr(pub String);

/// Logs the client address and records it as a [`ClientAddr`] extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIp;

impl Interceptor for ClientIp {
    fn intercept(&self, w: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        let ip = client_ip(req);
        info!(client_ip = %ip, "client address resolved");
        req.extensions_mut().insert(ClientAddr(ip));
        next.run(w, req);
    }
}

/// Resolves the client address of `req`.
///
/// Header values are read as sent; bytes that are not UTF-8 are replaced
/// rather than causing the header to be skipped.
pub fn client_ip(req: &Request) -> String {
    let forwarded = header_lossy(req, "x-forwarded-for");
    let first = forwarded
        .as_deref()
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or_default();
    if !first.is_empty() {
        return first.to_owned();
    }

    let real_ip = header_lossy(req, "x-real-ip");
    let real_ip = real_ip.as_deref().map(str::trim).unwrap_or_default();
    if !real_ip.is_empty() {
        return real_ip.to_owned();
    }

    match req.remote_addr() {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_owned(),
    }
}

fn header_lossy<'a>(req: &'a Request, name: &str) -> Option<Cow<'a, str>> {
    req.headers().get(name).map(|v| String::from_utf8_lossy(v.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use http::HeaderValue;

    use super::*;
    use crate::middleware::Chain;

    fn peer() -> SocketAddr {
        "192.0.2.10:40000".parse().unwrap()
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let req = Request::builder()
            .header("x-forwarded-for", " 203.0.113.5 , 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .remote_addr(peer())
            .build();
        assert_eq!(client_ip(&req), "203.0.113.5");
    }

    #[test]
    fn empty_forwarded_for_falls_through_to_real_ip() {
        let req = Request::builder()
            .header("x-forwarded-for", " , 10.0.0.1")
            .header("x-real-ip", " 10.0.0.2 ")
            .build();
        assert_eq!(client_ip(&req), "10.0.0.2");
    }

    #[test]
    fn non_utf8_forwarded_for_is_still_used() {
        let mut req = Request::builder()
            .header("x-real-ip", "10.0.0.2")
            .remote_addr(peer())
            .build();
        req.headers_mut().insert(
            "x-forwarded-for",
            HeaderValue::from_bytes(b"203.0.113.5, 10.0.0.\xff").unwrap(),
        );
        assert_eq!(client_ip(&req), "203.0.113.5");
    }

    #[test]
    fn peer_address_without_port() {
        let req = Request::builder().remote_addr(peer()).build();
        assert_eq!(client_ip(&req), "192.0.2.10");
    }

    #[test]
    fn ipv6_peer() {
        let addr: SocketAddr = "[2001:db8::1]:8080".parse().unwrap();
        let req = Request::builder().remote_addr(addr).build();
        assert_eq!(client_ip(&req), "2001:db8::1");
    }

    #[test]
    fn unknown_when_nothing_is_available() {
        assert_eq!(client_ip(&Request::builder().build()), "unknown");
    }

    #[test]
    fn stores_client_addr_for_later_stages() {
        let handler = Chain::new()
            .with(ClientIp)
            .compose(|w: &mut ResponseWriter, req: &mut Request| {
                if let Some(ClientAddr(ip)) = req.extensions().get::<ClientAddr>() {
                    w.write(ip.as_str());
                }
            });

        let mut w = ResponseWriter::new();
        let mut req = Request::builder().header("x-real-ip", "198.51.100.3").build();
        handler.call(&mut w, &mut req);
        assert_eq!(w.body(), b"198.51.100.3");
    }
}
