//! MMS download-state library.
//!
//! This library exposes the internal modules for the command-line binary and
//! the integration tests.

pub mod capability;
pub mod config;
pub mod download_manager;
pub mod error;
pub mod metrics;
pub mod settings;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use capability::{CapabilityProbe, ColumnProbe};
pub use download_manager::{DownloadState, DownloadStateManager, ManagerSlot};
pub use error::DownloadStateError;
pub use settings::SettingsAccessor;
