/// Structured error types for configuration resolution.
///
/// Uses `thiserror` so callers can match on the failing key. The binary
/// (greenlight-cli) turns these into a single fatal log line and an exit code;
/// nothing in this crate terminates the process.
use std::fmt;
use thiserror::Error;

/// Failure categories shared by configuration resolution and resource bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required source was absent (or empty)
    ConfigMissing,
    /// A source was present but failed coercion or parsing
    ConfigInvalid,
    /// The backing store could not be reached, or the probe ran out of time
    ResourceUnreachable,
    /// The resource descriptor, limits, or idle time were malformed
    ResourceMisconfigured,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigMissing => "config_missing",
            ErrorKind::ConfigInvalid => "config_invalid",
            ErrorKind::ResourceUnreachable => "resource_unreachable",
            ErrorKind::ResourceMisconfigured => "resource_misconfigured",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while resolving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable absent or empty
    #[error("required environment variable {key} is not set")]
    Missing { key: &'static str },

    /// Environment variable present but not coercible to the expected type
    #[error("environment variable {key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Command-line override rejected (also carries --help output)
    #[error(transparent)]
    Override(#[from] clap::Error),
}

/// Result type alias for configuration resolution
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a missing-variable error
    pub fn missing(key: &'static str) -> Self {
        Self::Missing { key }
    }

    /// Create an invalid-value error
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Missing { .. } => ErrorKind::ConfigMissing,
            ConfigError::Invalid { .. } | ConfigError::Override(_) => ErrorKind::ConfigInvalid,
        }
    }

    /// The environment key involved, when the error came from the environment
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ConfigError::Missing { key } | ConfigError::Invalid { key, .. } => Some(key),
            ConfigError::Override(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::missing("DB_DSN");
        assert_eq!(
            err.to_string(),
            "required environment variable DB_DSN is not set"
        );

        let err = ConfigError::invalid("PORT", "abc", "invalid digit found in string");
        assert!(err.to_string().contains("PORT=\"abc\""));
        assert!(err.to_string().contains("invalid digit"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ConfigError::missing("ENV").kind(), ErrorKind::ConfigMissing);
        assert_eq!(
            ConfigError::invalid("PORT", "x", "bad").kind(),
            ErrorKind::ConfigInvalid
        );
        assert_eq!(ConfigError::missing("ENV").key(), Some("ENV"));
        assert_eq!(ErrorKind::ResourceUnreachable.to_string(), "resource_unreachable");
    }
}
