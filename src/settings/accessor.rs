use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::source::PropertySource;

/// Longest key a property source accepts.
pub const MAX_KEY_LEN: usize = 32;

/// Longest value a property source accepts.
pub const MAX_VALUE_LEN: usize = 91;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid configuration key '{key}': {len} characters (max: {max})")]
    InvalidKey { key: String, len: usize, max: usize },
}

/// Parse a property value as a boolean.
///
/// `n`, `no`, `0`, `false`, `off` are false and `y`, `yes`, `1`, `true`, `on`
/// are true, ignoring case. Anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "n" | "no" | "0" | "false" | "off" => Some(false),
        "y" | "yes" | "1" | "true" | "on" => Some(true),
        _ => None,
    }
}

/// Best-effort typed view over a [`PropertySource`].
///
/// Every getter returns the supplied default when the value is absent, empty,
/// unparsable, or the source errors. The only error surfaced is an oversized
/// key.
#[derive(Clone)]
pub struct SettingsAccessor {
    source: Arc<dyn PropertySource>,
}

impl SettingsAccessor {
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        Self { source }
    }

    fn check_key(key: &str) -> Result<(), SettingsError> {
        let len = key.chars().count();
        if len > MAX_KEY_LEN {
            return Err(SettingsError::InvalidKey {
                key: key.to_string(),
                len,
                max: MAX_KEY_LEN,
            });
        }
        Ok(())
    }

    /// Raw lookup shared by the typed getters. Empty values count as unset.
    fn lookup(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Self::check_key(key)?;
        match self.source.get(key) {
            Ok(Some(value)) if !value.is_empty() => Ok(Some(value)),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!("Property source failed reading '{}': {:#}", key, e);
                Ok(None)
            }
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> Result<String, SettingsError> {
        Ok(self.lookup(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// Like [`Self::get_string`] with an empty default.
    pub fn get_string_or_empty(&self, key: &str) -> Result<String, SettingsError> {
        self.get_string(key, "")
    }

    pub fn get_int(&self, key: &str, default: i32) -> Result<i32, SettingsError> {
        self.parse_or(key, default, |v| v.parse::<i32>().ok())
    }

    pub fn get_long(&self, key: &str, default: i64) -> Result<i64, SettingsError> {
        self.parse_or(key, default, |v| v.parse::<i64>().ok())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, SettingsError> {
        self.parse_or(key, default, parse_bool)
    }

    fn parse_or<T: Copy>(
        &self,
        key: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, SettingsError> {
        let Some(value) = self.lookup(key)? else {
            return Ok(default);
        };
        match parse(&value) {
            Some(parsed) => Ok(parsed),
            None => {
                debug!("Ignoring malformed value for '{}': {:?}", key, value);
                Ok(default)
            }
        }
    }

    /// Store a value. Failures other than an oversized key are logged and
    /// dropped, so a successful return does not guarantee the write landed.
    pub fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        Self::check_key(key)?;
        if value.chars().count() > MAX_VALUE_LEN {
            warn!(
                "Dropping value for '{}': {} characters exceeds {}",
                key,
                value.chars().count(),
                MAX_VALUE_LEN
            );
            return Ok(());
        }
        if let Err(e) = self.source.set(key, value) {
            warn!("Failed to store setting '{}': {:#}", key, e);
        }
        Ok(())
    }
}
