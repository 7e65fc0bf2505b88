//! End-to-end tests for the download-state manager over on-disk stores
//!
//! Each test builds a fresh database directory with one live and one expired
//! message, then drives the manager the way the command-line binary does.

mod common;

use common::*;
use mms_download_state::config::DownloadPolicySettings;
use mms_download_state::download_manager::{
    DownloadState, ManagerSlot, RecordStore, SqliteRecordStore, DEFERRED_MASK,
    SUBSCRIPTION_ID_COLUMN,
};
use mms_download_state::settings::{AUTO_DOWNLOAD_KEY, ROAMING_KEY};
use mms_download_state::DownloadStateError;

#[tokio::test]
async fn test_auto_download_off_defers_downloading() {
    let env = TestEnv::new();
    env.set_property(AUTO_DOWNLOAD_KEY, "false");
    let manager = env.manager();

    assert!(!manager.is_auto());
    manager.mark_state(LIVE_MESSAGE_ID, DownloadState::Downloading);

    assert_eq!(env.stored_status(LIVE_MESSAGE_ID), Some(0x85));
    assert_eq!(manager.get_state(LIVE_MESSAGE_ID), DownloadState::Downloading);
}

#[tokio::test]
async fn test_deferred_bit_follows_auto_flag_for_every_deferrable_state() {
    for (preference, deferred) in [("true", false), ("false", true)] {
        let env = TestEnv::new();
        env.set_property(AUTO_DOWNLOAD_KEY, preference);
        let manager = env.manager();

        for state in DownloadState::ALL {
            if state == DownloadState::PermanentFailure {
                continue;
            }
            manager.mark_state(LIVE_MESSAGE_ID, state);

            let expected = if deferred {
                state.code() | DEFERRED_MASK
            } else {
                state.code()
            };
            assert_eq!(env.stored_status(LIVE_MESSAGE_ID), Some(expected), "{}", state);
            assert_eq!(manager.get_state(LIVE_MESSAGE_ID), state);
        }
    }
}

#[tokio::test]
async fn test_every_state_reads_back_as_written() {
    for preference in ["true", "false"] {
        let env = TestEnv::new();
        env.set_property(AUTO_DOWNLOAD_KEY, preference);
        let manager = env.manager();

        for state in DownloadState::ALL {
            manager.mark_state(LIVE_MESSAGE_ID, state);
            assert_eq!(manager.get_state(LIVE_MESSAGE_ID), state, "{}", state);
            assert_eq!(manager.get_state(LIVE_MESSAGE_ID), state, "{}", state);
        }
    }
}

#[tokio::test]
async fn test_get_state_is_idempotent() {
    let env = TestEnv::new();
    env.set_property(AUTO_DOWNLOAD_KEY, "off");
    let manager = env.manager();
    manager.mark_state(LIVE_MESSAGE_ID, DownloadState::TransientFailure);

    let first = manager.get_state(LIVE_MESSAGE_ID);
    let second = manager.get_state(LIVE_MESSAGE_ID);
    assert_eq!(first, second);
    assert_eq!(first, DownloadState::TransientFailure);
}

#[tokio::test]
async fn test_expired_message_is_deleted_on_retrieval() {
    let env = TestEnv::new();
    let manager = env.manager();

    manager.mark_state(EXPIRED_MESSAGE_ID, DownloadState::Downloading);
    manager.flush_notifications().await;

    assert!(env.store.load(EXPIRED_MESSAGE_ID).unwrap().is_none());
    assert_eq!(env.surface.messages(), vec![EXPIRED_NOTICE.to_string()]);
    assert_eq!(manager.get_state(EXPIRED_MESSAGE_ID), DownloadState::Unstarted);
}

#[tokio::test]
async fn test_permanent_failure_notifies_and_is_unmasked() {
    for preference in ["yes", "no"] {
        let env = TestEnv::new();
        env.set_property(AUTO_DOWNLOAD_KEY, preference);
        let manager = env.manager();

        manager.mark_state(LIVE_MESSAGE_ID, DownloadState::PermanentFailure);
        manager.flush_notifications().await;

        assert_eq!(env.stored_status(LIVE_MESSAGE_ID), Some(0x87));
        assert_eq!(
            manager.get_state(LIVE_MESSAGE_ID),
            DownloadState::PermanentFailure
        );
        assert_eq!(
            env.surface.messages(),
            vec![format!(
                "Download of message \"{}\" from Unknown sender failed.",
                LIVE_MESSAGE_SUBJECT
            )]
        );
    }
}

#[tokio::test]
async fn test_missing_message_is_left_alone() {
    let env = TestEnv::new();
    let manager = env.manager();

    manager.mark_state(MISSING_MESSAGE_ID, DownloadState::PermanentFailure);
    manager.mark_state(MISSING_MESSAGE_ID, DownloadState::Downloading);
    manager.flush_notifications().await;

    assert!(env.surface.messages().is_empty());
    assert!(env.store.load(MISSING_MESSAGE_ID).unwrap().is_none());
    assert_eq!(manager.get_state(MISSING_MESSAGE_ID), DownloadState::Unstarted);
}

#[tokio::test]
async fn test_roaming_only_matters_when_configured() {
    let env = TestEnv::new();
    env.set_property(ROAMING_KEY, "true");

    assert!(env.manager().is_auto());
    assert!(!env
        .manager_with_policy(DownloadPolicySettings {
            always_auto_when_roaming: false,
        })
        .is_auto());
}

#[tokio::test]
async fn test_preference_is_read_once_at_construction() {
    let env = TestEnv::new();
    let manager = env.manager();
    env.set_property(AUTO_DOWNLOAD_KEY, "false");

    assert!(manager.is_auto());
    manager.mark_state(LIVE_MESSAGE_ID, DownloadState::Downloading);
    assert_eq!(env.stored_status(LIVE_MESSAGE_ID), Some(0x81));
}

#[tokio::test]
async fn test_notices_keep_submission_order() {
    let env = TestEnv::new();
    let manager = env.manager();

    manager.show_error_code_toast(1);
    manager.mark_state(EXPIRED_MESSAGE_ID, DownloadState::PreDownloading);
    manager.show_error_code_toast(2);
    manager.shutdown().await;

    assert_eq!(
        env.surface.messages(),
        vec![
            "Message download error (code 1).".to_string(),
            EXPIRED_NOTICE.to_string(),
            "Message download error (code 2).".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_state_survives_reopening_the_database() {
    let env = TestEnv::new();
    env.set_property(AUTO_DOWNLOAD_KEY, "0");
    env.manager()
        .mark_state(LIVE_MESSAGE_ID, DownloadState::SkipRetrying);

    let reopened = SqliteRecordStore::new(env.db_dir.join("mms_notifications.db")).unwrap();
    let record = reopened.load(LIVE_MESSAGE_ID).unwrap().unwrap();
    assert_eq!(record.status, Some(0x89 | DEFERRED_MASK));
    assert!(reopened.has_column(SUBSCRIPTION_ID_COLUMN).unwrap());
}

#[tokio::test]
async fn test_manager_slot_lifecycle() {
    let env = TestEnv::new();
    let slot = ManagerSlot::new();

    assert!(matches!(
        slot.get(),
        Err(DownloadStateError::UninitializedAccess)
    ));

    slot.init(env.manager());
    assert!(slot.get().unwrap().supports_optional_column());
}
