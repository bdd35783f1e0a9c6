//! Unified error type.

use std::net::SocketAddr;

use thiserror::Error;

/// The error type returned by hdrecho's fallible operations.
///
/// Request-level failures (404, 500, etc.) are status codes on the
/// [`ResponseWriter`](crate::ResponseWriter), not `Error`s. This type surfaces
/// infrastructure failures: binding a port or configuring logging.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging: {0}")]
    Logging(String),
}
