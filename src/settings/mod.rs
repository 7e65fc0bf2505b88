//! Typed access to named configuration properties.
//!
//! Properties are plain strings in a [`PropertySource`]; the
//! [`SettingsAccessor`] layers typed getters on top and falls back to the
//! caller's default whenever a value is missing, malformed, or the source
//! itself fails.

mod accessor;
mod schema;
mod source;
mod sqlite_source;

pub use accessor::{parse_bool, SettingsAccessor, SettingsError, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use schema::SETTINGS_VERSIONED_SCHEMAS;
pub use source::{MemoryPropertySource, PropertySource};
pub use sqlite_source::SqlitePropertySource;

#[cfg(feature = "mock")]
pub use source::MockPropertySource;

/// User preference controlling automatic MMS retrieval.
pub const AUTO_DOWNLOAD_KEY: &str = "auto_download_mms";

/// Operator roaming indicator, `"true"` while roaming.
pub const ROAMING_KEY: &str = "gsm.operator.isroaming";
