//! Thread-safe progress reporting from the supervision thread.
//!
//! Two delivery surfaces backed by one pair: a bounded channel for
//! presentation layers that want every message they can keep up with, and a
//! last-value cell for layers that only redraw the most recent line.
//! Reporting never blocks the supervision thread; when the channel is full
//! the new message's channel copy is dropped and only the last-value cell
//! reflects it, so "most recent wins" holds for the cell while the channel
//! keeps the oldest unread backlog.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;

/// Default channel capacity; progress lines are small and transient.
const DEFAULT_CAPACITY: usize = 32;

type LatestCell = Arc<Mutex<Option<String>>>;

/// Sending half, held by the supervisor.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: Sender<String>,
    latest: LatestCell,
}

/// Receiving half, held by the presentation layer.
pub struct ProgressStream {
    rx: Receiver<String>,
    latest: LatestCell,
}

/// Create a connected reporter/stream pair with the default capacity.
#[must_use]
pub fn progress_pair() -> (ProgressReporter, ProgressStream) {
    progress_pair_with_capacity(DEFAULT_CAPACITY)
}

/// Create a connected reporter/stream pair with an explicit capacity.
#[must_use]
pub fn progress_pair_with_capacity(capacity: usize) -> (ProgressReporter, ProgressStream) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    let latest: LatestCell = Arc::new(Mutex::new(None));
    (
        ProgressReporter {
            tx,
            latest: Arc::clone(&latest),
        },
        ProgressStream { rx, latest },
    )
}

impl ProgressReporter {
    /// Publish one progress message. Never blocks; a full or disconnected
    /// channel only drops the channel copy, the last-value cell always
    /// reflects this message afterwards.
    pub fn report(&self, message: &str) {
        *self.latest.lock() = Some(message.to_string());
        match self.tx.try_send(message.to_string()) {
            Ok(()) | Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {}
        }
    }
}

impl ProgressStream {
    /// Most recent message reported so far, if any.
    #[must_use]
    pub fn latest(&self) -> Option<String> {
        self.latest.lock().clone()
    }

    /// Block up to `timeout` for the next channel message.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain whatever is currently buffered without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }
}
