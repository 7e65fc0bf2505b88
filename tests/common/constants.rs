//! Shared constants for integration tests

/// Message whose expiry lies far in the future
pub const LIVE_MESSAGE_ID: i64 = 1;

/// Message that expired long ago
pub const EXPIRED_MESSAGE_ID: i64 = 2;

/// Id never inserted into the record store
pub const MISSING_MESSAGE_ID: i64 = 404;

/// 2100-01-01T00:00:00Z
pub const FAR_FUTURE_EXPIRY: i64 = 4_102_444_800;

/// 2001-09-09T01:46:40Z
pub const LONG_AGO_EXPIRY: i64 = 1_000_000_000;

pub const LIVE_MESSAGE_SUBJECT: &str = "Weekend photos";

pub const EXPIRED_NOTICE: &str = "Message expired or not available.";
