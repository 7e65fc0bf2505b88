//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestEnv, LIVE_MESSAGE_ID};
//! use mms_download_state::DownloadState;
//!
//! #[tokio::test]
//! async fn test_state() {
//!     let env = TestEnv::new();
//!     let manager = env.manager();
//!     manager.mark_state(LIVE_MESSAGE_ID, DownloadState::Downloading);
//! }
//! ```

#![allow(dead_code)]

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{RecordingNotifier, TestEnv};
