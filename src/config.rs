//! Command-line and environment configuration.
//!
//! Every flag has an environment fallback so the same image runs unchanged
//! under a process supervisor, docker or a Kubernetes pod spec.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

/// Runtime configuration for the `hdrecho` binary.
#[derive(Clone, Debug, Parser)]
#[command(name = "hdrecho", version, about = "Echoes request headers and a version string over HTTP")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "HDRECHO_ADDR", default_value = "0.0.0.0:80")]
    pub addr: SocketAddr,

    /// Version string reported by the echo handler.
    #[arg(long = "app-version", env = "VERSION", default_value = "")]
    pub app_version: String,

    /// Log filter directive, e.g. `info` or `hdrecho=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "hdrecho",
            "--addr",
            "127.0.0.1:8080",
            "--app-version",
            "v1.2.3",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.app_version, "v1.2.3");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_address_is_rejected_at_parse_time() {
        let err = Config::try_parse_from(["hdrecho", "--addr", "not-an-address"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(Config::try_parse_from(["hdrecho", "--log-format", "xml"]).is_err());
    }
}
