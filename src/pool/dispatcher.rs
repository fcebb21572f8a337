//! Dispatcher thread: pending queue → bounded job channel

use crate::core::{Job, PoolError, Result};
use crate::queue::{NextJob, PendingQueue};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Counters shared between the pool and the dispatcher
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub(crate) dispatched: AtomicU64,
    /// Jobs abandoned because every worker was gone
    pub(crate) undeliverable: AtomicU64,
}

/// Handle to the single dispatcher thread.
///
/// The dispatcher owns the only sender of the job channel. When it exits the
/// channel closes, and workers finish whatever is buffered and stop.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    thread_name: String,
    thread: Option<thread::JoinHandle<()>>,
}

impl Dispatcher {
    pub(crate) fn spawn(
        thread_name: String,
        pending: Arc<PendingQueue>,
        jobs: Sender<Job>,
        interval: Duration,
        counters: Arc<DispatchCounters>,
    ) -> Result<Self> {
        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || Self::run(pending, jobs, interval, counters))
            .map_err(|e| PoolError::spawn(thread_name.clone(), e))?;

        Ok(Self {
            thread_name,
            thread: Some(thread),
        })
    }

    /// Waits for the dispatcher to exit. It exits once the pending queue is
    /// closed and empty.
    pub(crate) fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(&self.thread_name, "Dispatcher panicked"))?;
        }
        Ok(())
    }

    fn run(
        pending: Arc<PendingQueue>,
        jobs: Sender<Job>,
        interval: Duration,
        counters: Arc<DispatchCounters>,
    ) {
        log::debug!("dispatcher started");

        loop {
            match pending.next_timeout(interval) {
                NextJob::Job(job) => {
                    let job_id = job.id;
                    // Lock already released; this send is where backpressure lands
                    if let Err(err) = jobs.send(job) {
                        let rest = pending.close_and_discard();
                        log::error!(
                            "no workers left to receive job {}, dispatcher exiting with {} more jobs abandoned",
                            err.0.id,
                            rest.len()
                        );
                        counters
                            .undeliverable
                            .fetch_add(1 + rest.len() as u64, Ordering::Relaxed);
                        break;
                    }
                    counters.dispatched.fetch_add(1, Ordering::Relaxed);
                    log::trace!("dispatched job {}", job_id);
                    #[cfg(feature = "tracing")]
                    crate::telemetry::metrics::record_dispatch(pending.len());
                }
                NextJob::Empty => continue,
                NextJob::Closed => break,
            }
        }

        log::debug!(
            "dispatcher stopped after {} jobs",
            counters.dispatched.load(Ordering::Relaxed)
        );
        // `jobs` drops here, closing the channel for workers
    }
}
