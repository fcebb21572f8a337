//! Tracing integration for observability.
//!
//! Enabled with the `tracing` feature. Workers enter a `worker` span for their
//! whole life and a `job_execution` span per job; the functions in
//! [`metrics`] emit metric-style events that a `tracing` subscriber (or a
//! tracing-to-metrics bridge) can aggregate.
//!
//! # Example
//!
//! ```rust,ignore
//! use image_batch_pool::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("image_batch_pool=trace".parse().unwrap()))
//!     .init();
//!
//! let pool = WorkerPool::new(4, 100)?;
//! pool.start(ImageConverter::new())?;
//! ```

/// Metrics recording functions.
///
/// Field names follow the `counter.*`, `gauge.*` and `histogram.*` convention
/// understood by tracing-based metrics exporters.
pub mod metrics {
    use crate::core::Priority;
    use std::time::Duration;

    /// Records a job accepted into the pending queue.
    #[inline]
    pub fn record_submission(priority: Priority, queue_depth: usize) {
        tracing::trace!(
            counter.jobs_submitted = 1,
            gauge.queue_depth = queue_depth as i64,
            priority = %priority,
            "job submitted"
        );
    }

    /// Records a job moved from the pending queue into the job channel.
    #[inline]
    pub fn record_dispatch(queue_depth: usize) {
        tracing::trace!(
            counter.jobs_dispatched = 1,
            gauge.queue_depth = queue_depth as i64,
            "job dispatched"
        );
    }

    /// Records job completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration, success: bool) {
        let duration_ms = duration.as_millis() as u64;
        if success {
            tracing::trace!(
                counter.jobs_converted = 1,
                histogram.job_duration_ms = duration_ms,
                "job converted"
            );
        } else {
            tracing::trace!(
                counter.jobs_failed = 1,
                histogram.job_duration_ms = duration_ms,
                "job failed"
            );
        }
    }

    /// Records a converter panic.
    #[inline]
    pub fn record_panic(duration: Duration) {
        tracing::trace!(
            counter.jobs_panicked = 1,
            histogram.job_duration_ms = duration.as_millis() as u64,
            "converter panicked"
        );
    }

    /// Records worker becoming busy.
    #[inline]
    pub fn record_worker_busy(worker_id: usize) {
        tracing::trace!(gauge.workers_busy = 1, worker_id = worker_id, "worker busy");
    }

    /// Records worker becoming idle.
    #[inline]
    pub fn record_worker_idle(worker_id: usize) {
        tracing::trace!(
            gauge.workers_busy = -1i64,
            worker_id = worker_id,
            "worker idle"
        );
    }

    /// Records an outcome dropped because the result buffer was full.
    #[inline]
    pub fn record_result_dropped(worker_id: usize) {
        tracing::debug!(
            counter.results_dropped = 1,
            worker_id = worker_id,
            "result dropped"
        );
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(num_workers: usize, channel_capacity: usize) {
        tracing::info!(
            workers = num_workers,
            channel_capacity = channel_capacity,
            "worker pool started"
        );
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_shutdown(jobs_done: u64, jobs_failed: u64, discarded: u64) {
        tracing::info!(
            jobs_done = jobs_done,
            jobs_failed = jobs_failed,
            discarded = discarded,
            "worker pool shutdown complete"
        );
    }
}
