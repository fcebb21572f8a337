//! Best-effort result stream from workers to observers.
//!
//! Workers never block on a slow consumer: when the bounded buffer is full the
//! outcome is dropped and counted, so the loss is observable through
//! [`ResultStream::dropped`].

use crate::core::{JobId, Priority};
use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a job ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The converter succeeded and reported this conversion time
    Converted {
        /// Time reported by the converter
        duration: Duration,
    },
    /// The converter returned an error or panicked
    Failed {
        /// Rendered error
        error: String,
    },
}

/// One event on the result stream.
///
/// `Display` renders the human-readable log line; the fields are there for
/// consumers that want structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    /// Worker that executed the job
    pub worker_id: usize,
    /// Job identity
    pub job_id: JobId,
    /// Job priority
    pub priority: Priority,
    /// Source path
    pub source: PathBuf,
    /// Destination path
    pub destination: PathBuf,
    /// Wall time measured by the worker
    pub elapsed: Duration,
    /// Success or failure
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl JobOutcome {
    /// Whether the conversion succeeded
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Converted { .. })
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            OutcomeStatus::Converted { duration } => write!(
                f,
                "Worker #{} OK: {} -> {} in {:?} (priority: {})",
                self.worker_id,
                self.source.display(),
                self.destination.display(),
                duration,
                self.priority
            ),
            OutcomeStatus::Failed { error } => write!(
                f,
                "Worker #{} ERROR: {} -> {}: {}",
                self.worker_id,
                self.source.display(),
                self.destination.display(),
                error
            ),
        }
    }
}

/// Creates a bounded result channel.
///
/// # Panics
///
/// Panics if `capacity` is 0.
pub fn result_channel(capacity: usize) -> (ResultSink, ResultStream) {
    assert!(capacity > 0, "capacity must be greater than 0");
    let (sender, receiver) = channel::bounded(capacity);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        ResultSink {
            sender,
            dropped: Arc::clone(&dropped),
        },
        ResultStream { receiver, dropped },
    )
}

/// Sending half, cloned into every worker.
///
/// The stream closes once every sink has been dropped.
#[derive(Debug, Clone)]
pub struct ResultSink {
    sender: Sender<JobOutcome>,
    dropped: Arc<AtomicU64>,
}

impl ResultSink {
    /// Publishes without blocking. Returns `false` if the outcome was dropped.
    pub fn publish(&self, outcome: JobOutcome) -> bool {
        match self.sender.try_send(outcome) {
            Ok(()) => true,
            Err(TrySendError::Full(outcome)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("result buffer full, dropping: {}", outcome);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                // Nobody holds a stream any more; the outcome has no audience
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of outcomes dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Receive-only view of the result stream.
///
/// Cloning yields another consumer on the same channel; each outcome is
/// delivered to exactly one of them.
#[derive(Debug, Clone)]
pub struct ResultStream {
    receiver: Receiver<JobOutcome>,
    dropped: Arc<AtomicU64>,
}

impl ResultStream {
    /// Blocks for the next outcome. `None` once the pool has stopped and the
    /// buffer is empty.
    pub fn recv(&self) -> Option<JobOutcome> {
        self.receiver.recv().ok()
    }

    /// Returns a buffered outcome without blocking
    pub fn try_recv(&self) -> Option<JobOutcome> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next outcome
    pub fn recv_timeout(&self, timeout: Duration) -> Result<JobOutcome, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Blocking iterator that ends when the stream closes
    pub fn iter(&self) -> channel::Iter<'_, JobOutcome> {
        self.receiver.iter()
    }

    /// Drains whatever is buffered right now
    pub fn try_iter(&self) -> channel::TryIter<'_, JobOutcome> {
        self.receiver.try_iter()
    }

    /// Number of buffered outcomes
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Number of outcomes workers dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl IntoIterator for ResultStream {
    type Item = JobOutcome;
    type IntoIter = channel::IntoIter<JobOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}
