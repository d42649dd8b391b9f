//! Tracing setup for the greenlight binary
//!
//! Usage:
//!   greenlight                        # Compact logs on stderr
//!   LOG_FORMAT=json greenlight        # One JSON object per line
//!   RUST_LOG=greenlight=debug ...     # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (default: info)
//!   LOG_FORMAT                        # `json` or anything else for compact

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for `--version` and `--help`.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|err| anyhow!(err))
    } else {
        builder
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .compact()
            .try_init()
            .map_err(|err| anyhow!(err))
    }
}
