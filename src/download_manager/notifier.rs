//! User-facing download notices.
//!
//! Notices are queued on a bounded channel and delivered, in order, by a
//! single task. Callers of the download-state manager never wait for
//! delivery and never see delivery failures.

use anyhow::Result;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metrics;

pub const NO_SUBJECT: &str = "(No subject)";
pub const UNKNOWN_SENDER: &str = "Unknown sender";

/// Default capacity of the notice queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A message shown to the user about a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadNotice {
    /// A retrieval was attempted after the message expired.
    Expired,
    /// Retrieval failed for good.
    PermanentFailure { subject: String, from: String },
    /// A numeric error code reported by the transport layer.
    ErrorCode(i32),
}

impl DownloadNotice {
    /// Failure notice for a message, with placeholders for missing fields.
    pub fn permanent_failure(subject: Option<&str>) -> Self {
        DownloadNotice::PermanentFailure {
            subject: subject.unwrap_or(NO_SUBJECT).to_string(),
            from: UNKNOWN_SENDER.to_string(),
        }
    }
}

impl fmt::Display for DownloadNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadNotice::Expired => write!(f, "Message expired or not available."),
            DownloadNotice::PermanentFailure { subject, from } => {
                write!(f, "Download of message \"{}\" from {} failed.", subject, from)
            }
            DownloadNotice::ErrorCode(code) => write!(f, "Message download error (code {}).", code),
        }
    }
}

/// Surface that shows a notice to the user.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait UserNotifier: Send + Sync {
    fn notify(&self, message: &str) -> Result<()>;
}

/// Writes notices to the log. Used by the command-line binary.
pub struct LogNotifier;

impl UserNotifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<()> {
        info!("[notice] {}", message);
        Ok(())
    }
}

#[derive(Debug)]
enum NoticeCommand {
    Deliver(DownloadNotice),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// FIFO queue of notices drained by a single delivery task.
pub struct NotificationDispatcher {
    command_tx: mpsc::Sender<NoticeCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationDispatcher {
    /// Start the delivery task. Must be called from within a Tokio runtime.
    pub fn spawn(surface: Arc<dyn UserNotifier>, capacity: usize) -> Self {
        let (command_tx, command_rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_delivery_loop(surface, command_rx));
        Self {
            command_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue a notice without waiting. Drops it if the queue is full or closed.
    pub fn dispatch(&self, notice: DownloadNotice) {
        let (reason, rejected) = match self.command_tx.try_send(NoticeCommand::Deliver(notice)) {
            Ok(()) => return,
            Err(TrySendError::Full(command)) => ("full", command),
            Err(TrySendError::Closed(command)) => ("closed", command),
        };
        warn!("Notice queue {}, dropping {:?}", reason, rejected);
        metrics::record_notice("dropped");
    }

    /// Resolve once every notice queued before this call has been handled.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.command_tx.send(NoticeCommand::Flush(tx)).await.is_err() {
            return;
        }
        let _ = rx.await;
    }

    /// Deliver what is queued, then stop the delivery task.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(NoticeCommand::Shutdown).await;
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!("Notice delivery task ended abnormally: {}", e);
            }
        }
    }
}

async fn run_delivery_loop(
    surface: Arc<dyn UserNotifier>,
    mut command_rx: mpsc::Receiver<NoticeCommand>,
) {
    while let Some(command) = command_rx.recv().await {
        match command {
            NoticeCommand::Deliver(notice) => deliver(surface.as_ref(), &notice),
            NoticeCommand::Flush(done) => {
                let _ = done.send(());
            }
            NoticeCommand::Shutdown => break,
        }
    }
    command_rx.close();
    // Anything that slipped in before close is still delivered
    while let Ok(command) = command_rx.try_recv() {
        match command {
            NoticeCommand::Deliver(notice) => deliver(surface.as_ref(), &notice),
            NoticeCommand::Flush(done) => {
                let _ = done.send(());
            }
            NoticeCommand::Shutdown => {}
        }
    }
    debug!("Notice delivery task stopped");
}

fn deliver(surface: &dyn UserNotifier, notice: &DownloadNotice) {
    let text = notice.to_string();
    match catch_unwind(AssertUnwindSafe(|| surface.notify(&text))) {
        Ok(Ok(())) => metrics::record_notice("delivered"),
        Ok(Err(e)) => {
            warn!("Failed to deliver notice '{}': {:#}", text, e);
            metrics::record_notice("failed");
        }
        Err(_) => {
            warn!("Notice surface panicked while delivering '{}'", text);
            metrics::record_notice("failed");
        }
    }
}
