//! Worker thread implementation

use crate::core::{Converter, Job, JobError, JobId, Priority, PoolError, Result};
#[cfg(feature = "metrics")]
use crate::metrics::PriorityMetrics;
use crate::queue::{JobOutcome, OutcomeStatus, ResultSink};
use crossbeam_channel::Receiver;
use crossbeam_utils::sync::WaitGroup;
use parking_lot::Mutex;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::{debug, span, Level};

fn nanos(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
}

/// Mean of `total` over `count` items, zero when `count` is zero
pub(crate) fn mean(total: Duration, count: u64) -> Duration {
    match total.as_nanos().checked_div(u128::from(count)) {
        Some(avg) => Duration::from_nanos(u64::try_from(avg).unwrap_or(u64::MAX)),
        None => Duration::ZERO,
    }
}

/// Statistics for a worker thread.
///
/// Single writer: only the owning worker's loop mutates these counters.
/// Readers go through [`snapshot`](Self::snapshot), which reads each field
/// independently. A snapshot can therefore be torn, e.g. `is_busy` already
/// cleared while `jobs_done` has not been incremented yet. Totals are exact
/// once the worker has exited.
#[derive(Debug)]
pub struct WorkerStats {
    id: usize,
    jobs_done: AtomicU64,
    jobs_failed: AtomicU64,
    total_execution_ns: AtomicU64,
    busy: AtomicBool,
    // A JobId has no spare value for "none", so this one field sits behind a lock
    current_job: Mutex<Option<JobId>>,
    by_priority: [AtomicU64; 3],
}

impl WorkerStats {
    /// Create zeroed statistics for worker `id`
    pub fn new(id: usize) -> Self {
        Self {
            id,
            jobs_done: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            total_execution_ns: AtomicU64::new(0),
            busy: AtomicBool::new(false),
            current_job: Mutex::new(None),
            by_priority: Default::default(),
        }
    }

    fn begin_job(&self, job: &Job) {
        self.busy.store(true, Ordering::Relaxed);
        *self.current_job.lock() = Some(job.id);
        self.by_priority[job.priority.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn finish_job(&self, elapsed: Duration, failed: bool) {
        if failed {
            self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.jobs_done.fetch_add(1, Ordering::Relaxed);
        self.total_execution_ns
            .fetch_add(nanos(elapsed), Ordering::Relaxed);
        self.busy.store(false, Ordering::Relaxed);
        *self.current_job.lock() = None;
    }

    /// Worker id (1-based)
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get total jobs finished, failed ones included
    pub fn get_jobs_done(&self) -> u64 {
        self.jobs_done.load(Ordering::Relaxed)
    }

    /// Get total jobs whose conversion failed
    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    /// Whether a job is executing right now
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Relaxed)
    }

    /// Copy every counter into a plain value
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            id: self.id,
            jobs_done: self.jobs_done.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            total_execution_time: Duration::from_nanos(
                self.total_execution_ns.load(Ordering::Relaxed),
            ),
            is_busy: self.busy.load(Ordering::Relaxed),
            current_job: *self.current_job.lock(),
            high_priority_jobs: self.by_priority[Priority::High.index()].load(Ordering::Relaxed),
            mid_priority_jobs: self.by_priority[Priority::Mid.index()].load(Ordering::Relaxed),
            low_priority_jobs: self.by_priority[Priority::Low.index()].load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a worker's [`WorkerStats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStatsSnapshot {
    /// Worker id (1-based)
    pub id: usize,
    /// Jobs finished, failed ones included
    pub jobs_done: u64,
    /// Jobs whose conversion failed
    pub jobs_failed: u64,
    /// Cumulative wall time spent executing jobs
    pub total_execution_time: Duration,
    /// Whether a job was executing
    pub is_busy: bool,
    /// The job being executed, if any
    pub current_job: Option<JobId>,
    /// High priority jobs started
    pub high_priority_jobs: u64,
    /// Mid priority jobs started
    pub mid_priority_jobs: u64,
    /// Low priority jobs started
    pub low_priority_jobs: u64,
}

impl WorkerStatsSnapshot {
    /// Mean wall time per finished job
    pub fn average_execution_time(&self) -> Duration {
        mean(self.total_execution_time, self.jobs_done)
    }

    /// Jobs started at the given priority
    pub fn jobs_at(&self, priority: Priority) -> u64 {
        match priority {
            Priority::High => self.high_priority_jobs,
            Priority::Mid => self.mid_priority_jobs,
            Priority::Low => self.low_priority_jobs,
        }
    }
}

/// Everything a worker thread owns
pub(crate) struct WorkerContext {
    pub(crate) id: usize,
    pub(crate) thread_name: String,
    pub(crate) jobs: Receiver<Job>,
    pub(crate) converter: Arc<dyn Converter>,
    pub(crate) results: ResultSink,
    pub(crate) done: WaitGroup,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Arc<PriorityMetrics>,
}

/// A worker thread that executes jobs from the job channel
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread_name: String,
    thread: Option<thread::JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a worker thread.
    ///
    /// The worker exits once the job channel is closed and empty, so every
    /// job the dispatcher handed over is executed before shutdown completes.
    pub(crate) fn spawn(ctx: WorkerContext) -> Result<Self> {
        let id = ctx.id;
        let thread_name = ctx.thread_name.clone();
        let stats = Arc::new(WorkerStats::new(id));
        let stats_clone = Arc::clone(&stats);

        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                Self::run(ctx, stats_clone);
            })
            .map_err(|e| PoolError::spawn(thread_name.clone(), e))?;

        Ok(Self {
            id,
            thread_name,
            thread: Some(thread),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Join the worker thread
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(&self.thread_name, "Worker panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    fn run(ctx: WorkerContext, stats: Arc<WorkerStats>) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = ctx.id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        #[cfg(feature = "tracing")]
        debug!("worker started");

        for job in ctx.jobs.iter() {
            #[cfg(feature = "tracing")]
            crate::telemetry::metrics::record_worker_busy(ctx.id);

            Self::execute_job(&ctx, job, &stats);

            #[cfg(feature = "tracing")]
            crate::telemetry::metrics::record_worker_idle(ctx.id);
        }

        log::info!(
            "Worker #{} finished. Jobs done: {}",
            ctx.id,
            stats.get_jobs_done()
        );
        drop(ctx.done);
    }

    /// Execute a single job with panic protection
    fn execute_job(ctx: &WorkerContext, job: Job, stats: &WorkerStats) {
        #[cfg(feature = "tracing")]
        let job_span = span!(Level::DEBUG, "job_execution", job_id = job.id.0, priority = %job.priority);
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        stats.begin_job(&job);
        log::debug!(
            "Worker #{} starting job {} ({} priority)",
            ctx.id,
            job.id,
            job.priority
        );

        let start = Instant::now();
        let panic_result = catch_unwind(AssertUnwindSafe(|| ctx.converter.convert(&job)));
        let elapsed = start.elapsed();

        let status = match panic_result {
            Ok(Ok(duration)) => {
                #[cfg(feature = "tracing")]
                crate::telemetry::metrics::record_completion(elapsed, true);
                OutcomeStatus::Converted { duration }
            }
            Ok(Err(e)) => {
                log::warn!("Worker #{}: job {} failed: {}", ctx.id, job.id, e);
                #[cfg(feature = "tracing")]
                crate::telemetry::metrics::record_completion(elapsed, false);
                OutcomeStatus::Failed {
                    error: e.to_string(),
                }
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                log::error!("Worker #{}: job {} panicked: {}", ctx.id, job.id, panic_msg);
                #[cfg(feature = "tracing")]
                crate::telemetry::metrics::record_panic(elapsed);
                OutcomeStatus::Failed {
                    error: JobError::Panicked(panic_msg).to_string(),
                }
            }
        };
        let failed = !matches!(status, OutcomeStatus::Converted { .. });

        #[cfg(feature = "metrics")]
        ctx.metrics.record(job.priority, elapsed, !failed);

        let outcome = JobOutcome {
            worker_id: ctx.id,
            job_id: job.id,
            priority: job.priority,
            source: job.source,
            destination: job.destination,
            elapsed,
            status,
        };
        if !ctx.results.publish(outcome) {
            #[cfg(feature = "tracing")]
            crate::telemetry::metrics::record_result_dropped(ctx.id);
        }

        stats.finish_job(elapsed, failed);
    }
}
