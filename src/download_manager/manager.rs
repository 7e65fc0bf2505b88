//! Download-state manager.
//!
//! Owns every status transition of an MMS notification record and the side
//! effects tied to them: expired messages are deleted when a retrieval is
//! attempted, permanent failures are reported to the user, and transitions
//! made while auto-download is off carry the deferred bit.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capability::CapabilityProbe;
use crate::error::DownloadStateError;
use crate::metrics;
use crate::settings::SettingsAccessor;

use super::notifier::{DownloadNotice, NotificationDispatcher};
use super::policy::DownloadPolicy;
use super::record_store::{MessageId, MessageRecord, RecordStore};
use super::state::{DownloadState, PackedStatus};

pub struct DownloadStateManager {
    store: Arc<dyn RecordStore>,
    notices: NotificationDispatcher,
    auto_download: bool,
    optional_column: bool,
}

impl DownloadStateManager {
    /// Build the manager, evaluating the auto-download policy and the
    /// capability probe once.
    pub fn new(
        store: Arc<dyn RecordStore>,
        notices: NotificationDispatcher,
        settings: &SettingsAccessor,
        probe: &dyn CapabilityProbe,
        policy: DownloadPolicy,
    ) -> Result<Self, DownloadStateError> {
        let auto_download = policy.evaluate(settings)?;
        let optional_column = probe.probe_optional_column();
        info!(
            "Download state manager ready (auto_download={}, optional_column={})",
            auto_download, optional_column
        );
        Ok(Self {
            store,
            notices,
            auto_download,
            optional_column,
        })
    }

    /// Whether new messages are retrieved without user action.
    pub fn is_auto(&self) -> bool {
        self.auto_download
    }

    pub fn supports_optional_column(&self) -> bool {
        self.optional_column
    }

    /// Move a message to `requested`, applying the transition side effects.
    ///
    /// Never fails: a missing record or an unavailable store aborts the
    /// transition with a log line.
    pub fn mark_state(&self, id: MessageId, requested: DownloadState) {
        let record = match self.load_record(id) {
            Ok(record) => record,
            Err(e) => {
                match &e {
                    DownloadStateError::RecordNotFound(_) => {
                        debug!("Not marking {} as {}: {}", id, requested, e);
                        metrics::record_skipped_transition("missing_record");
                    }
                    _ => {
                        warn!("Not marking {} as {}: {}", id, requested, e);
                        metrics::record_skipped_transition("store_error");
                    }
                }
                return;
            }
        };

        let now = chrono::Utc::now().timestamp();
        if requested.is_retrieval_attempt() && record.is_expired_at(now) {
            self.discard_expired(&record);
            return;
        }

        let packed = if requested == DownloadState::PermanentFailure {
            self.notices
                .dispatch(DownloadNotice::permanent_failure(record.subject.as_deref()));
            PackedStatus::immediate(requested)
        } else {
            PackedStatus::new(requested, !self.auto_download && requested.can_defer())
        };

        self.write_status(id, packed);
    }

    /// Current base state of a message, without the deferred bit.
    ///
    /// `Unstarted` when the record or its status is missing or the store
    /// fails. A stored code that matches no base state, with or without the
    /// deferred bit, reads as `Unknown`.
    pub fn get_state(&self, id: MessageId) -> DownloadState {
        let record = match self.load_record(id) {
            Ok(record) => record,
            Err(e) => {
                debug!("Reporting {} as UNSTARTED: {}", id, e);
                return DownloadState::Unstarted;
            }
        };
        match record.status {
            None => DownloadState::Unstarted,
            Some(status) => match PackedStatus::from_i32(status) {
                Some(packed) => packed.state,
                None => {
                    warn!("Message {} has unrecognized status {:#x}", id, status);
                    DownloadState::Unknown
                }
            },
        }
    }

    /// Tell the user about a transport error code. Does not wait for delivery.
    pub fn show_error_code_toast(&self, code: i32) {
        self.notices.dispatch(DownloadNotice::ErrorCode(code));
    }

    /// Wait until every notice queued so far has been handled.
    pub async fn flush_notifications(&self) {
        self.notices.flush().await;
    }

    /// Drain pending notices and stop the delivery task.
    pub async fn shutdown(&self) {
        self.notices.shutdown().await;
    }

    fn load_record(&self, id: MessageId) -> Result<MessageRecord, DownloadStateError> {
        self.store
            .load(id)?
            .ok_or(DownloadStateError::RecordNotFound(id))
    }

    fn discard_expired(&self, record: &MessageRecord) {
        info!(
            "Message {} expired at {}, deleting notification",
            record.id, record.expiry
        );
        self.notices.dispatch(DownloadNotice::Expired);
        match self.store.delete(record.id) {
            Ok(true) => metrics::record_expired_deletion(),
            Ok(false) => debug!("Expired message {} was already gone", record.id),
            Err(e) => warn!("Failed to delete expired message {}: {:#}", record.id, e),
        }
    }

    fn write_status(&self, id: MessageId, packed: PackedStatus) {
        match self.store.update_status(id, packed.to_i32()) {
            Ok(true) => {
                debug!(
                    "Message {} -> {} (deferred={}, status={:#x})",
                    id,
                    packed.state,
                    packed.deferred,
                    packed.to_i32()
                );
                metrics::record_status_write(packed.state.as_str(), packed.deferred);
            }
            Ok(false) => debug!("Message {} disappeared before its status was written", id),
            Err(e) => warn!("Failed to write status for message {}: {:#}", id, e),
        }
    }
}


#[cfg(all(test, feature = "mock"))]
mod mock_tests {
    use super::*;
    use crate::capability::MockCapabilityProbe;
    use crate::download_manager::notifier::MockUserNotifier;
    use crate::download_manager::record_store::MockRecordStore;
    use crate::settings::{MemoryPropertySource, AUTO_DOWNLOAD_KEY};
    use anyhow::anyhow;
    use mockall::predicate::eq;

    fn manager_with(store: MockRecordStore, auto: bool) -> DownloadStateManager {
        let mut probe = MockCapabilityProbe::new();
        probe.expect_probe_optional_column().times(1).return_const(false);
        let mut surface = MockUserNotifier::new();
        surface.expect_notify().returning(|_| Ok(()));
        let value = if auto { "true" } else { "false" };
        let settings = SettingsAccessor::new(Arc::new(MemoryPropertySource::with_values([(
            AUTO_DOWNLOAD_KEY,
            value,
        )])));
        DownloadStateManager::new(
            Arc::new(store),
            NotificationDispatcher::spawn(Arc::new(surface), 4),
            &settings,
            &probe,
            DownloadPolicy::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_store_error_aborts_without_write() {
        let mut store = MockRecordStore::new();
        store
            .expect_load()
            .with(eq(5))
            .returning(|_| Err(anyhow!("database is locked")));
        store.expect_update_status().never();
        store.expect_delete().never();

        let manager = manager_with(store, true);
        manager.mark_state(5, DownloadState::Downloading);
        assert_eq!(manager.get_state(5), DownloadState::Unstarted);
        assert!(!manager.supports_optional_column());
    }

    #[tokio::test]
    async fn test_deferred_write_goes_through_store() {
        let mut store = MockRecordStore::new();
        store
            .expect_load()
            .returning(|id| Ok(Some(MessageRecord::new(id, i64::MAX))));
        store
            .expect_update_status()
            .with(eq(6), eq(0x8C))
            .times(1)
            .returning(|_, _| Ok(true));

        let manager = manager_with(store, false);
        manager.mark_state(6, DownloadState::PreDownloading);
    }

    #[tokio::test]
    async fn test_expired_delete_failure_skips_write() {
        let mut store = MockRecordStore::new();
        store
            .expect_load()
            .returning(|id| Ok(Some(MessageRecord::new(id, 0))));
        store
            .expect_delete()
            .times(1)
            .returning(|_| Err(anyhow!("disk I/O error")));
        store.expect_update_status().never();

        let manager = manager_with(store, true);
        manager.mark_state(7, DownloadState::Downloading);
    }
}
