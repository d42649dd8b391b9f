//! Error types for greenlight-server

use std::time::Duration;

use greenlight_core::ErrorKind;
use thiserror::Error;

pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Failure while opening and verifying the connection pool
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("invalid database DSN: {0}")]
    InvalidDsn(#[source] sqlx::Error),

    #[error("{name} = {value} is out of range for a connection limit")]
    LimitOutOfRange { name: &'static str, value: i64 },

    #[error("invalid idle time {value:?}: {source}")]
    InvalidIdleTime {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("database unreachable: {0}")]
    Unreachable(#[source] sqlx::Error),

    #[error("database health probe timed out after {deadline:?}")]
    ProbeTimedOut { deadline: Duration },
}

impl BootstrapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BootstrapError::InvalidDsn(_)
            | BootstrapError::LimitOutOfRange { .. }
            | BootstrapError::InvalidIdleTime { .. } => ErrorKind::ResourceMisconfigured,
            BootstrapError::Unreachable(_) | BootstrapError::ProbeTimedOut { .. } => {
                ErrorKind::ResourceUnreachable
            }
        }
    }

    /// True for both a failed probe and one that ran out of time
    pub fn is_unreachable(&self) -> bool {
        self.kind() == ErrorKind::ResourceUnreachable
    }
}

/// Error raised by the application context
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ContextError {
    #[error("application is shutting down; no new background work accepted")]
    ShuttingDown,
}
