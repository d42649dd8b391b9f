//! greenlight-core: configuration resolution for the greenlight API
//!
//! Merges required environment settings with optional command-line overrides
//! into one immutable [`ResolvedConfig`]. Nothing in this crate exits the
//! process; failures come back as [`ConfigError`].

pub mod config;
pub mod env;
pub mod error;
pub mod overrides;

pub use config::{
    parse_origins, resolve, ConfigBuilder, CorsConfig, DbConfig, LimiterConfig, Resolution,
    ResolvedConfig, SmtpConfig,
};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ConfigError, ErrorKind, Result};
pub use overrides::Overrides;

/// Application version reported by `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
