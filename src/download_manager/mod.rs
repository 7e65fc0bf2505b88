//! MMS download-state management.
//!
//! Tracks the download status of every MMS notification record, decides
//! whether retrieval happens automatically, and tells the user about expired
//! and failed downloads.

mod manager;
mod notifier;
mod policy;
mod record_store;
mod schema;
mod slot;
mod state;

pub use manager::DownloadStateManager;
pub use notifier::{
    DownloadNotice, LogNotifier, NotificationDispatcher, UserNotifier, DEFAULT_QUEUE_CAPACITY,
    NO_SUBJECT, UNKNOWN_SENDER,
};
pub use policy::{auto_download_preference, is_roaming, DownloadPolicy};
pub use record_store::{MessageId, MessageRecord, RecordStore, SqliteRecordStore};
pub use schema::{
    MMS_NOTIFICATIONS_TABLE, MMS_NOTIFICATIONS_VERSIONED_SCHEMAS, SUBSCRIPTION_ID_COLUMN,
};
pub use slot::ManagerSlot;
pub use state::{DownloadState, PackedStatus, DEFERRED_MASK};

#[cfg(feature = "mock")]
pub use notifier::MockUserNotifier;
#[cfg(feature = "mock")]
pub use record_store::MockRecordStore;
