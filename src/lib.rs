//! # hdrecho
//!
//! A minimal HTTP diagnostic server. Point a client, a load balancer or an
//! ingress at it and it answers with the request headers it received plus a
//! configured version string. `/healthz` answers liveness probes.
//!
//! ## The pipeline
//!
//! Requests flow through a [`middleware::Chain`] of interceptors wrapped
//! around a terminal handler. Each interceptor may work before and after the
//! rest of the chain, or stop the request short:
//!
//! - [`middleware::ClientIp`] resolves the caller's address from forwarding
//!   headers or the peer socket and logs it
//! - [`middleware::StatusLog`] logs the status the handler set
//! - [`middleware::Trace`] wraps the request in a `tracing` span
//!
//! The response sink, [`ResponseWriter`], is shared by `&mut` through every
//! stage, so post-work sees what downstream stages wrote.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hdrecho::middleware::{Chain, ClientIp, StatusLog};
//! use hdrecho::{Router, Server, echo, health};
//!
//! #[tokio::main]
//! async fn main() {
//!     let chain = Chain::new().with(ClientIp).with(StatusLog);
//!
//!     let app = Router::new()
//!         .route("/healthz", health::liveness)
//!         .fallback(chain.compose(echo::headers("v1.0.0")));
//!
//!     Server::bind(([0, 0, 0, 0], 8080).into()).serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod echo;
pub mod health;
pub mod logging;
pub mod middleware;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use request::{Request, RequestBuilder};
pub use response::ResponseWriter;
pub use router::Router;
pub use server::Server;

/// Builds the application router: `/healthz` bare, every other path through
/// `ClientIp` and `StatusLog` into the echo handler reporting `version`.
pub fn app(version: impl Into<String>) -> Router {
    let chain = middleware::Chain::new()
        .with(middleware::ClientIp)
        .with(middleware::StatusLog);

    Router::new()
        .route("/healthz", health::liveness)
        .fallback(chain.compose(echo::headers(version)))
}
