//! `hdrecho` binary.
//!
//! Run with:
//!   VERSION=v1.0.0 cargo run -- --addr 127.0.0.1:8080
//!
//! Try:
//!   curl http://localhost:8080/
//!   curl -H 'X-Forwarded-For: 203.0.113.9' http://localhost:8080/anything
//!   curl http://localhost:8080/healthz

use clap::Parser;
use hdrecho::{Config, Server, logging};

#[tokio::main]
async fn main() -> Result<(), hdrecho::Error> {
    let config = Config::parse();
    logging::init(&config.log_level, config.log_format)?;

    tracing::info!(
        addr = %config.addr,
        version = %config.app_version,
        "hdrecho starting"
    );

    Server::bind(config.addr)
        .serve(hdrecho::app(config.app_version))
        .await
}
