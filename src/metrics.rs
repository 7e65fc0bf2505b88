//! Prometheus metrics for download-state transitions and user notices.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

const PREFIX: &str = "mms_download";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref STATUS_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_status_writes_total"), "Download statuses written to the record store"),
        &["state", "deferred"]
    ).expect("Failed to create status_writes_total metric");

    pub static ref EXPIRED_DELETIONS_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_expired_deletions_total"),
        "Expired notifications deleted on a retrieval attempt"
    ).expect("Failed to create expired_deletions_total metric");

    pub static ref SKIPPED_TRANSITIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_skipped_transitions_total"), "State transitions aborted before any write"),
        &["reason"]
    ).expect("Failed to create skipped_transitions_total metric");

    pub static ref NOTICES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(format!("{PREFIX}_notices_total"), "User notices by delivery outcome"),
        &["outcome"]
    ).expect("Failed to create notices_total metric");
}

/// Register all metrics. Safe to call more than once.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(STATUS_WRITES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(EXPIRED_DELETIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SKIPPED_TRANSITIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(NOTICES_TOTAL.clone()));
}

pub fn record_status_write(state: &str, deferred: bool) {
    STATUS_WRITES_TOTAL
        .with_label_values(&[state, if deferred { "true" } else { "false" }])
        .inc();
}

pub fn record_expired_deletion() {
    EXPIRED_DELETIONS_TOTAL.inc();
}

pub fn record_skipped_transition(reason: &str) {
    SKIPPED_TRANSITIONS_TOTAL.with_label_values(&[reason]).inc();
}

/// `outcome` is one of `delivered`, `failed`, `dropped`.
pub fn record_notice(outcome: &str) {
    NOTICES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let mut buffer = vec![];
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}
