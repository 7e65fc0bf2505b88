//! Download states and the packed status encoding used by the record store.

use clap::ValueEnum;

/// Bit ORed onto a base state when auto-download is off.
pub const DEFERRED_MASK: i32 = 0x04;

/// Base download state of an MMS notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DownloadState {
    Unknown,
    Unstarted,
    Downloading,
    TransientFailure,
    PermanentFailure,
    PreDownloading,
    /// Retry scheduler gave up on retrieving while auto-download is off.
    SkipRetrying,
}

impl DownloadState {
    pub const ALL: [DownloadState; 7] = [
        DownloadState::Unknown,
        DownloadState::Unstarted,
        DownloadState::Downloading,
        DownloadState::TransientFailure,
        DownloadState::PermanentFailure,
        DownloadState::PreDownloading,
        DownloadState::SkipRetrying,
    ];

    pub fn code(&self) -> i32 {
        match self {
            DownloadState::Unknown => 0x00,
            DownloadState::Unstarted => 0x80,
            DownloadState::Downloading => 0x81,
            DownloadState::TransientFailure => 0x82,
            DownloadState::PermanentFailure => 0x87,
            DownloadState::PreDownloading => 0x88,
            DownloadState::SkipRetrying => 0x89,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Unknown => "UNKNOWN",
            DownloadState::Unstarted => "UNSTARTED",
            DownloadState::Downloading => "DOWNLOADING",
            DownloadState::TransientFailure => "TRANSIENT_FAILURE",
            DownloadState::PermanentFailure => "PERMANENT_FAILURE",
            DownloadState::PreDownloading => "PRE_DOWNLOADING",
            DownloadState::SkipRetrying => "SKIP_RETRYING",
        }
    }

    /// Whether a transition into this state may carry the deferred bit.
    pub fn can_defer(&self) -> bool {
        !matches!(self, DownloadState::PermanentFailure)
    }

    /// States that trigger the expiry check when requested.
    pub fn is_retrieval_attempt(&self) -> bool {
        matches!(
            self,
            DownloadState::Downloading | DownloadState::PreDownloading
        )
    }
}

impl std::fmt::Display for DownloadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as stored in the record's integer `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedStatus {
    pub state: DownloadState,
    pub deferred: bool,
}

impl PackedStatus {
    pub fn new(state: DownloadState, deferred: bool) -> Self {
        Self { state, deferred }
    }

    pub fn immediate(state: DownloadState) -> Self {
        Self::new(state, false)
    }

    pub fn to_i32(self) -> i32 {
        if self.deferred {
            self.state.code() | DEFERRED_MASK
        } else {
            self.state.code()
        }
    }

    /// Decode a stored status. `None` if the base code is not a known state.
    ///
    /// An exact base code wins over the deferred reading: `PermanentFailure`
    /// (0x87) already has the deferred bit set in its own code.
    pub fn from_i32(value: i32) -> Option<Self> {
        if let Some(state) = DownloadState::from_code(value) {
            return Some(Self::immediate(state));
        }
        DownloadState::from_code(value & !DEFERRED_MASK)
            .filter(DownloadState::can_defer)
            .map(|state| Self::new(state, true))
    }
}
