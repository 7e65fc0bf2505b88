//! On-disk stores and a recording notice surface for integration tests.

use super::constants::*;
use anyhow::Result;
use mms_download_state::capability::ColumnProbe;
use mms_download_state::config::DownloadPolicySettings;
use mms_download_state::download_manager::{
    DownloadPolicy, DownloadStateManager, MessageRecord, NotificationDispatcher, RecordStore,
    SqliteRecordStore, UserNotifier,
};
use mms_download_state::settings::{PropertySource, SettingsAccessor, SqlitePropertySource};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Notice surface that keeps every delivered message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// A temporary database directory with a live and an expired message.
pub struct TestEnv {
    // Held so the directory outlives the stores
    _dir: TempDir,
    pub db_dir: PathBuf,
    pub store: Arc<SqliteRecordStore>,
    pub properties: Arc<SqlitePropertySource>,
    pub surface: Arc<RecordingNotifier>,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_dir = dir.path().to_path_buf();
        let store = Arc::new(SqliteRecordStore::new(db_dir.join("mms_notifications.db")).unwrap());
        let properties = Arc::new(SqlitePropertySource::new(db_dir.join("settings.db")).unwrap());

        store
            .insert(
                &MessageRecord::new(LIVE_MESSAGE_ID, FAR_FUTURE_EXPIRY)
                    .with_subject(LIVE_MESSAGE_SUBJECT),
            )
            .unwrap();
        store
            .insert(&MessageRecord::new(EXPIRED_MESSAGE_ID, LONG_AGO_EXPIRY))
            .unwrap();

        Self {
            _dir: dir,
            db_dir,
            store,
            properties,
            surface: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn set_property(&self, key: &str, value: &str) {
        self.properties.set(key, value).unwrap();
    }

    pub fn settings(&self) -> SettingsAccessor {
        SettingsAccessor::new(self.properties.clone())
    }

    /// Manager with the default policy. Must be called inside a Tokio runtime.
    pub fn manager(&self) -> DownloadStateManager {
        self.manager_with_policy(DownloadPolicySettings::default())
    }

    pub fn manager_with_policy(&self, policy: DownloadPolicySettings) -> DownloadStateManager {
        let probe = ColumnProbe::new(self.store.clone());
        DownloadStateManager::new(
            self.store.clone(),
            NotificationDispatcher::spawn(self.surface.clone(), 16),
            &self.settings(),
            &probe,
            DownloadPolicy::new(&policy),
        )
        .unwrap()
    }

    pub fn stored_status(&self, id: i64) -> Option<i32> {
        self.store.load(id).unwrap().and_then(|record| record.status)
    }
}
