//! Command-line overrides
//!
//! Every flag is optional: an absent flag leaves the environment-derived or
//! literal default in place. Flags use the usual `--name value` form; the
//! legacy single-dash spelling (`-port 4000`, `-limiter-enabled=false`) is
//! rewritten by [`normalize_args`] before clap sees it.

use std::ffi::OsString;

use clap::{CommandFactory, Parser};

use crate::env::parse_bool;

/// Optional overrides for every configuration field
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(
    name = "greenlight",
    about = "Greenlight API server",
    disable_version_flag = true
)]
pub struct Overrides {
    /// API server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Environment (development|staging|production)
    #[arg(long, allow_hyphen_values = true)]
    pub env: Option<String>,

    /// PostgreSQL DSN
    #[arg(long = "db-dsn", allow_hyphen_values = true)]
    pub db_dsn: Option<String>,

    /// PostgreSQL max open connections (<= 0 means unlimited)
    #[arg(long = "db-max-open-conns", allow_negative_numbers = true)]
    pub db_max_open_conns: Option<i64>,

    /// PostgreSQL max idle connections (<= 0 means unlimited)
    #[arg(long = "db-max-idle-conns", allow_negative_numbers = true)]
    pub db_max_idle_conns: Option<i64>,

    /// PostgreSQL max connection idle time (e.g. 15m)
    #[arg(long = "db-max-idle-time", allow_hyphen_values = true)]
    pub db_max_idle_time: Option<String>,

    /// Rate limiter maximum requests per second
    #[arg(long = "limiter-rps")]
    pub limiter_rps: Option<f64>,

    /// Rate limiter maximum burst
    #[arg(long = "limiter-burst")]
    pub limiter_burst: Option<u32>,

    /// Enable rate limiter
    #[arg(
        long = "limiter-enabled",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool
    )]
    pub limiter_enabled: Option<bool>,

    /// SMTP host
    #[arg(long = "smtp-host", allow_hyphen_values = true)]
    pub smtp_host: Option<String>,

    /// SMTP port
    #[arg(long = "smtp-port")]
    pub smtp_port: Option<u16>,

    /// SMTP username
    #[arg(long = "smtp-username", allow_hyphen_values = true)]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long = "smtp-password", allow_hyphen_values = true)]
    pub smtp_password: Option<String>,

    /// SMTP sender
    #[arg(long = "smtp-sender", allow_hyphen_values = true)]
    pub smtp_sender: Option<String>,

    /// Trusted CORS origins (space separated)
    #[arg(long = "cors-trusted-origins", allow_hyphen_values = true)]
    pub cors_trusted_origins: Option<String>,

    /// Display version and exit
    #[arg(
        long,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value = "false",
        value_parser = parse_bool
    )]
    pub version: bool,
}

impl Overrides {
    /// Parse overrides from a full argv (program name first).
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

/// Rewrite `-name` / `-name=value` into `--name` / `--name=value` for known
/// long flags. The argument after a value-taking flag is its value and is
/// never rewritten. Anything after a bare `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Overrides::command();
    let mut known = vec!["help".to_string()];
    let mut takes_value = Vec::new();
    for arg in command.get_arguments() {
        let Some(long) = arg.get_long() else {
            continue;
        };
        if arg.get_action().takes_values() && !arg.is_require_equals_set() {
            takes_value.push(long.to_string());
        }
        known.push(long.to_string());
    }

    let mut out = Vec::new();
    let mut args = args.into_iter().map(Into::into);
    out.extend(args.next());

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if text == "--" {
            out.push(arg);
            out.extend(args.by_ref());
            break;
        }

        let name = match text.strip_prefix("--") {
            Some(rest) => Some(rest),
            None => text.strip_prefix('-'),
        };
        let Some(name) = name.filter(|name| !name.starts_with('-')) else {
            out.push(arg);
            continue;
        };
        let (name, inline_value) = match name.split_once('=') {
            Some((name, _)) => (name, true),
            None => (name, false),
        };
        if !known.iter().any(|k| k == name) {
            out.push(arg);
            continue;
        }

        let pending_value = !inline_value && takes_value.iter().any(|k| k == name);
        if text.starts_with("--") {
            out.push(arg);
        } else {
            out.push(OsString::from(format!("-{text}")));
        }
        if pending_value {
            out.extend(args.next());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_yields_no_overrides() {
        let overrides = Overrides::parse_args(["greenlight"]).unwrap();
        assert_eq!(overrides, Overrides::default());
    }

    #[test]
    fn single_dash_flags_are_accepted() {
        let overrides = Overrides::parse_args([
            "greenlight",
            "-port",
            "4000",
            "-db-max-open-conns=-1",
            "-limiter-enabled=false",
            "-cors-trusted-origins",
            "http://a.test http://b.test",
        ])
        .unwrap();
        assert_eq!(overrides.port, Some(4000));
        assert_eq!(overrides.db_max_open_conns, Some(-1));
        assert_eq!(overrides.limiter_enabled, Some(false));
        assert_eq!(
            overrides.cors_trusted_origins.as_deref(),
            Some("http://a.test http://b.test")
        );
    }

    #[test]
    fn bare_bool_flags_mean_true() {
        let overrides =
            Overrides::parse_args(["greenlight", "--limiter-enabled", "--version"]).unwrap();
        assert_eq!(overrides.limiter_enabled, Some(true));
        assert!(overrides.version);
    }

    #[test]
    fn negative_values_are_not_rewritten() {
        let args = normalize_args(["greenlight", "--db-max-idle-conns", "-5", "-unknown"]);
        assert_eq!(args[2], OsString::from("-5"));
        assert_eq!(args[3], OsString::from("-unknown"));

        let overrides =
            Overrides::parse_args(["greenlight", "--db-max-idle-conns", "-5"]).unwrap();
        assert_eq!(overrides.db_max_idle_conns, Some(-5));
    }

    #[test]
    fn dash_leading_values_are_kept_verbatim() {
        let args = normalize_args(["greenlight", "--smtp-password", "-port", "-port", "4000"]);
        assert_eq!(args[2], OsString::from("-port"));
        assert_eq!(args[3], OsString::from("--port"));

        let overrides = Overrides::parse_args([
            "greenlight",
            "-smtp-password",
            "-port",
            "--db-dsn",
            "-version",
            "-port",
            "4000",
        ])
        .unwrap();
        assert_eq!(overrides.smtp_password.as_deref(), Some("-port"));
        assert_eq!(overrides.db_dsn.as_deref(), Some("-version"));
        assert_eq!(overrides.port, Some(4000));
        assert!(!overrides.version);

        let overrides = Overrides::parse_args(["greenlight", "--smtp-password=-port"]).unwrap();
        assert_eq!(overrides.smtp_password.as_deref(), Some("-port"));
    }

    #[test]
    fn bool_flags_do_not_consume_the_next_argument() {
        let overrides =
            Overrides::parse_args(["greenlight", "-limiter-enabled", "-port", "4000"]).unwrap();
        assert_eq!(overrides.limiter_enabled, Some(true));
        assert_eq!(overrides.port, Some(4000));
    }

    #[test]
    fn bad_override_is_rejected() {
        let err = Overrides::parse_args(["greenlight", "-port", "http"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let err = Overrides::parse_args(["greenlight", "--limiter-enabled=maybe"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn command_is_well_formed() {
        Overrides::command().debug_assert();
    }
}
