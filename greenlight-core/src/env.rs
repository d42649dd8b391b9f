//! Environment access with typed coercion
//!
//! Every read goes through [`EnvSource`] so resolution can run against a plain
//! map in tests. An unset variable and a variable set to the empty string are
//! the same outcome (`None`); nothing here can tell them apart.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// A source of raw environment values
pub trait EnvSource {
    /// Raw value for `key`, or `None` when absent or empty
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

pub fn required_string(env: &impl EnvSource, key: &'static str) -> Result<String> {
    env.get(key).ok_or_else(|| ConfigError::missing(key))
}

/// Required integer of any width; range errors surface as `Invalid`.
pub fn required_int<T>(env: &impl EnvSource, key: &'static str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = required_string(env, key)?;
    raw.parse::<T>()
        .map_err(|err| ConfigError::invalid(key, raw.as_str(), err))
}

pub fn required_bool(env: &impl EnvSource, key: &'static str) -> Result<bool> {
    let raw = required_string(env, key)?;
    parse_bool(&raw).map_err(|reason| ConfigError::invalid(key, raw.as_str(), reason))
}

/// Optional string; absent reads as the empty string.
pub fn optional_string(env: &impl EnvSource, key: &str) -> String {
    env.get(key).unwrap_or_default()
}

/// Boolean parsing with the spellings accepted on the command line as well.
pub fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean value {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_and_absent_are_the_same() {
        let source = env(&[("EMPTY", "")]);
        assert_eq!(EnvSource::get(&source, "EMPTY"), None);
        assert_eq!(EnvSource::get(&source, "ABSENT"), None);
        assert!(matches!(
            required_string(&source, "EMPTY"),
            Err(ConfigError::Missing { key: "EMPTY" })
        ));
    }

    #[test]
    fn required_int_coerces() {
        let source = env(&[("PORT", "4000"), ("BAD", "40x0"), ("BIG", "70000")]);
        assert_eq!(required_int::<u16>(&source, "PORT").unwrap(), 4000);

        let err = required_int::<u16>(&source, "BAD").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BAD", .. }));

        let err = required_int::<u16>(&source, "BIG").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BIG", .. }));
        assert_eq!(required_int::<i64>(&source, "BIG").unwrap(), 70000);
    }

    #[test]
    fn negative_ints_are_accepted() {
        let source = env(&[("DB_MAX_OPEN_CONNS", "-1")]);
        assert_eq!(required_int::<i64>(&source, "DB_MAX_OPEN_CONNS").unwrap(), -1);
    }

    #[test]
    fn required_bool_spellings() {
        let source = env(&[("A", "T"), ("B", "0"), ("C", "yes")]);
        assert!(required_bool(&source, "A").unwrap());
        assert!(!required_bool(&source, "B").unwrap());
        assert!(matches!(
            required_bool(&source, "C"),
            Err(ConfigError::Invalid { key: "C", .. })
        ));
        assert!(matches!(
            required_bool(&source, "D"),
            Err(ConfigError::Missing { key: "D" })
        ));
    }

    #[test]
    fn optional_string_defaults_to_empty() {
        let source = env(&[("MAILTRAP_USER", "alice")]);
        assert_eq!(optional_string(&source, "MAILTRAP_USER"), "alice");
        assert_eq!(optional_string(&source, "MAILTRAP_PW"), "");
    }
}
