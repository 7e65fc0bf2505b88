//! Auto-download policy.
//!
//! Decides whether a newly notified MMS is retrieved immediately or left
//! deferred for the user to fetch by hand.

use tracing::debug;

use crate::config::DownloadPolicySettings;
use crate::settings::{SettingsAccessor, SettingsError, AUTO_DOWNLOAD_KEY, ROAMING_KEY};

/// Policy inputs that do not come from the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadPolicy {
    /// Keep auto-downloading while roaming. When false, roaming defers
    /// every retrieval regardless of the user preference.
    pub always_auto_when_roaming: bool,
}

impl DownloadPolicy {
    pub fn new(settings: &DownloadPolicySettings) -> Self {
        Self {
            always_auto_when_roaming: settings.always_auto_when_roaming,
        }
    }

    pub fn compute_auto_download(&self, stored_preference: bool, is_roaming: bool) -> bool {
        if !stored_preference {
            return false;
        }
        !is_roaming || self.always_auto_when_roaming
    }

    /// Read the preference and the roaming indicator and combine them.
    pub fn evaluate(&self, settings: &SettingsAccessor) -> Result<bool, SettingsError> {
        let preference = auto_download_preference(settings)?;
        let roaming = is_roaming(settings)?;
        let auto_download = self.compute_auto_download(preference, roaming);
        debug!(
            "Auto-download policy: preference={}, roaming={}, always_auto_when_roaming={} -> {}",
            preference, roaming, self.always_auto_when_roaming, auto_download
        );
        Ok(auto_download)
    }
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            always_auto_when_roaming: true,
        }
    }
}

/// Stored user preference, `true` when never set.
pub fn auto_download_preference(settings: &SettingsAccessor) -> Result<bool, SettingsError> {
    settings.get_bool(AUTO_DOWNLOAD_KEY, true)
}

/// Roaming only when the indicator is exactly `"true"`.
pub fn is_roaming(settings: &SettingsAccessor) -> Result<bool, SettingsError> {
    Ok(settings.get_string_or_empty(ROAMING_KEY)? == "true")
}
