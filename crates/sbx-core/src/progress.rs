//! Progress events from the pipeline and group workers to whoever is watching
//! (the CLI).
//!
//! Run and group lifecycle events are always delivered: the sender waits for
//! channel space. `PageSaved` uses `try_send` so a slow consumer never holds a
//! fetch back; a dropped page event is logged at debug level.
//!
//! Senders must not be driven from inside an async task: the pipeline runs on
//! plain threads (or `spawn_blocking`), never on a runtime worker.

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Summary query answered.
    IndexFetched { name: String, count: usize },
    /// Persisted index split into groups.
    Partitioned {
        total: usize,
        chunk: usize,
        sizes: Vec<usize>,
    },
    GroupStarted {
        group: usize,
        pages: usize,
    },
    PageSaved {
        group: usize,
        /// 1-based position of the page within its group.
        position: usize,
        id: String,
        title: String,
    },
    GroupFinished {
        group: usize,
        written: usize,
        error: Option<String>,
    },
}

impl ProgressEvent {
    /// Everything except per-page events.
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, ProgressEvent::PageSaved { .. })
    }
}

pub type ProgressSender = Sender<ProgressEvent>;

pub(crate) fn emit(tx: Option<&ProgressSender>, event: ProgressEvent) {
    let Some(tx) = tx else {
        return;
    };
    if event.is_lifecycle() {
        // Err only when the receiver is gone.
        let _ = tx.blocking_send(event);
        return;
    }
    match tx.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(dropped)) => {
            tracing::debug!(event = ?dropped, "progress channel full, page event dropped");
        }
    }
}
