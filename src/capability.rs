//! Memoized check for optional record-store columns.

use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::download_manager::{RecordStore, SUBSCRIPTION_ID_COLUMN};

/// Reports whether the record store supports the optional subscription column.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CapabilityProbe: Send + Sync {
    fn probe_optional_column(&self) -> bool;
}

/// Probe backed by a column lookup on a [`RecordStore`].
///
/// The lookup runs at most once per instance; later calls return the cached
/// answer. A failed lookup is cached as "not available".
pub struct ColumnProbe {
    store: Arc<dyn RecordStore>,
    column: &'static str,
    cached: OnceLock<bool>,
}

impl ColumnProbe {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::for_column(store, SUBSCRIPTION_ID_COLUMN)
    }

    pub fn for_column(store: Arc<dyn RecordStore>, column: &'static str) -> Self {
        Self {
            store,
            column,
            cached: OnceLock::new(),
        }
    }

    fn run_check(&self) -> bool {
        match self.store.has_column(self.column) {
            Ok(available) => {
                debug!("Optional column '{}' available: {}", self.column, available);
                available
            }
            Err(e) => {
                warn!(
                    "Could not check for optional column '{}', assuming unavailable: {:#}",
                    self.column, e
                );
                false
            }
        }
    }
}

impl CapabilityProbe for ColumnProbe {
    fn probe_optional_column(&self) -> bool {
        *self.cached.get_or_init(|| self.run_check())
    }
}
