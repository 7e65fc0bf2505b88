use std::sync::{Arc, PoisonError, RwLock};
use tracing::{error, warn};

use super::manager::DownloadStateManager;
use crate::error::DownloadStateError;

/// Process-wide holder for the download-state manager.
///
/// The composition root creates one slot, calls [`ManagerSlot::init`] once
/// and hands the slot to whoever needs the manager. Re-initializing replaces
/// the previous instance with a warning.
#[derive(Default)]
pub struct ManagerSlot {
    inner: RwLock<Option<Arc<DownloadStateManager>>>,
}

impl ManagerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&self, manager: DownloadStateManager) -> Arc<DownloadStateManager> {
        let manager = Arc::new(manager);
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.is_some() {
            warn!("{}, replacing the previous instance", DownloadStateError::AlreadyInitialized);
        }
        *inner = Some(manager.clone());
        manager
    }

    pub fn get(&self) -> Result<Arc<DownloadStateManager>, DownloadStateError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.clone().ok_or_else(|| {
            error!("{}", DownloadStateError::UninitializedAccess);
            DownloadStateError::UninitializedAccess
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
