//! Error taxonomy for the download-state core.

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors produced by the download-state manager and its composition root.
///
/// Only [`DownloadStateError::InvalidKey`] and
/// [`DownloadStateError::UninitializedAccess`] ever reach callers; the others
/// are logged where they happen.
#[derive(Debug, Error)]
pub enum DownloadStateError {
    #[error("Invalid configuration key '{key}': {len} characters (max: {max})")]
    InvalidKey { key: String, len: usize, max: usize },

    #[error("Message record not found: {0}")]
    RecordNotFound(i64),

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Download state manager already initialized")]
    AlreadyInitialized,

    #[error("Download state manager used before init")]
    UninitializedAccess,
}

impl From<SettingsError> for DownloadStateError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::InvalidKey { key, len, max } => {
                DownloadStateError::InvalidKey { key, len, max }
            }
        }
    }
}

impl From<anyhow::Error> for DownloadStateError {
    fn from(err: anyhow::Error) -> Self {
        DownloadStateError::StoreUnavailable(format!("{:#}", err))
    }
}
