//! Priority worker pool

use crate::core::{Converter, Job, PoolError, Result};
#[cfg(feature = "metrics")]
use crate::metrics::PriorityMetrics;
use crate::pool::config::{PoolConfig, PoolState, ShutdownPolicy};
use crate::pool::dispatcher::{DispatchCounters, Dispatcher};
use crate::pool::worker::{Worker, WorkerContext, WorkerStats, WorkerStatsSnapshot};
use crate::queue::{result_channel, PendingQueue, ResultSink, ResultStream};
use crossbeam_channel as channel;
use crossbeam_utils::sync::WaitGroup;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// What a stop call did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopReport {
    /// Policy that was applied
    pub policy: ShutdownPolicy,
    /// Accepted jobs abandoned without execution
    pub discarded: u64,
    /// Jobs executed over the pool's life, failures included
    pub jobs_done: u64,
    /// Outcomes lost because the result buffer was full
    pub results_dropped: u64,
}

/// Pool-wide counters at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Lifecycle state
    pub state: PoolState,
    /// Jobs accepted by `submit`
    pub submitted: u64,
    /// Jobs moved into the job channel
    pub dispatched: u64,
    /// Accepted jobs abandoned without execution
    pub discarded: u64,
    /// Jobs still waiting in the pending queue
    pub pending: usize,
    /// Jobs executed, failures included
    pub jobs_done: u64,
    /// Jobs whose conversion failed
    pub jobs_failed: u64,
    /// Outcomes dropped on a full result buffer
    pub results_dropped: u64,
    /// Workers executing a job right now
    pub busy_workers: usize,
}

/// A pool of converter threads fed in priority order.
///
/// `submit` pushes into a lock-guarded priority heap and never blocks on
/// worker capacity. A single dispatcher thread pops the most urgent job and
/// sends it down a bounded channel that the workers share; when that channel
/// is full the dispatcher blocks, which is the only place backpressure lands.
///
/// Jobs submitted before [`start`](Self::start) are held, so a whole batch is
/// ordered before the first dispatch.
///
/// # Example
///
/// ```rust
/// use image_batch_pool::prelude::*;
/// use std::time::Duration;
///
/// let pool = WorkerPool::new(2, 16)?;
/// pool.start(|_job: &Job| Ok::<_, JobError>(Duration::ZERO))?;
///
/// pool.submit(Job::new(JobId(1), Priority::High, "a.jpg", "a.png"))?;
/// pool.submit(Job::new(JobId(2), Priority::Low, "b.jpg", "b.png"))?;
///
/// let report = pool.stop_and_drain()?;
/// assert_eq!(report.jobs_done, 2);
/// # Ok::<(), image_batch_pool::core::PoolError>(())
/// ```
pub struct WorkerPool {
    config: PoolConfig,
    state: AtomicU8,
    // Serializes start and stop against each other
    lifecycle: Mutex<()>,
    pending: Arc<PendingQueue>,
    // The pool's own sink, handed to the workers by `start`
    sink: Mutex<Option<ResultSink>>,
    results: ResultStream,
    workers: RwLock<Vec<Worker>>,
    stats: RwLock<Vec<Arc<WorkerStats>>>,
    dispatcher: Mutex<Option<Dispatcher>>,
    wait_group: Mutex<Option<WaitGroup>>,
    submitted: AtomicU64,
    discarded: AtomicU64,
    dispatch: Arc<DispatchCounters>,
    #[cfg(feature = "metrics")]
    metrics: Arc<PriorityMetrics>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool with `num_workers` workers (0 = number of CPUs) and a job
    /// channel holding at most `channel_capacity` dispatched jobs.
    pub fn new(num_workers: usize, channel_capacity: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(num_workers).with_channel_capacity(channel_capacity))
    }

    /// Create a pool from a validated configuration. No threads are started.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let (sink, results) = result_channel(config.result_capacity);

        Ok(Self {
            state: AtomicU8::new(PoolState::Created as u8),
            lifecycle: Mutex::new(()),
            pending: Arc::new(PendingQueue::new()),
            sink: Mutex::new(Some(sink)),
            results,
            workers: RwLock::new(Vec::new()),
            stats: RwLock::new(Vec::new()),
            dispatcher: Mutex::new(None),
            wait_group: Mutex::new(None),
            submitted: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            dispatch: Arc::new(DispatchCounters::default()),
            #[cfg(feature = "metrics")]
            metrics: Arc::new(PriorityMetrics::new()),
            config,
        })
    }

    /// Start the workers and the dispatcher.
    ///
    /// A pool starts at most once. Calling this in any state but
    /// [`PoolState::Created`] returns [`PoolError::AlreadyStarted`].
    pub fn start<C: Converter + 'static>(&self, converter: C) -> Result<()> {
        self.start_shared(Arc::new(converter))
    }

    /// Like [`start`](Self::start), for a converter that is already shared
    pub fn start_shared(&self, converter: Arc<dyn Converter>) -> Result<()> {
        let _lifecycle = self.lifecycle.lock();

        let state = self.state();
        if state != PoolState::Created {
            return Err(PoolError::already_started(self.name(), state));
        }
        let sink = self
            .sink
            .lock()
            .take()
            .ok_or_else(|| PoolError::already_started(self.name(), state))?;

        let (job_tx, job_rx) = channel::bounded::<Job>(self.config.channel_capacity);
        let wait_group = WaitGroup::new();

        let mut workers = Vec::with_capacity(self.config.num_workers);
        for id in 1..=self.config.num_workers {
            let ctx = WorkerContext {
                id,
                thread_name: format!("{}-{}", self.config.thread_name_prefix, id),
                jobs: job_rx.clone(),
                converter: Arc::clone(&converter),
                results: sink.clone(),
                done: wait_group.clone(),
                #[cfg(feature = "metrics")]
                metrics: Arc::clone(&self.metrics),
            };
            match Worker::spawn(ctx) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    drop(job_tx);
                    self.abort_start(workers);
                    return Err(e);
                }
            }
        }
        // Workers hold the only receivers and result sinks from here on
        drop(job_rx);
        drop(sink);

        let dispatcher = match Dispatcher::spawn(
            format!("{}-dispatcher", self.config.thread_name_prefix),
            Arc::clone(&self.pending),
            job_tx,
            self.config.dispatch_interval,
            Arc::clone(&self.dispatch),
        ) {
            Ok(dispatcher) => dispatcher,
            Err(e) => {
                self.abort_start(workers);
                return Err(e);
            }
        };

        *self.stats.write() = workers.iter().map(Worker::stats).collect();
        *self.workers.write() = workers;
        *self.dispatcher.lock() = Some(dispatcher);
        *self.wait_group.lock() = Some(wait_group);
        self.set_state(PoolState::Running);

        log::info!(
            "Worker pool '{}' started: {} workers, converter {}, {} jobs pending",
            self.name(),
            self.config.num_workers,
            converter.name(),
            self.pending.len()
        );
        #[cfg(feature = "tracing")]
        crate::telemetry::metrics::record_pool_start(
            self.config.num_workers,
            self.config.channel_capacity,
        );

        Ok(())
    }

    // The job sender is already gone, so spawned workers exit on their own
    fn abort_start(&self, workers: Vec<Worker>) {
        self.pending.close();
        for worker in workers {
            if let Err(e) = worker.join() {
                log::error!("{}", e);
            }
        }
        self.set_state(PoolState::Stopped);
    }

    /// Queue a job.
    ///
    /// Never blocks on worker capacity. Accepted while the pool is `Created`
    /// or `Running`. A submit racing with stop is either accepted before the
    /// pending queue closes (and then executed or counted as discarded) or
    /// rejected with [`PoolError::QueueClosed`].
    pub fn submit(&self, job: Job) -> Result<()> {
        let state = self.state();
        if !matches!(state, PoolState::Created | PoolState::Running) {
            return Err(PoolError::not_running(self.name(), state));
        }

        let job_id = job.id;
        let priority = job.priority;
        match self.pending.push(job) {
            Ok(depth) => {
                self.submitted.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "submitted job {} ({} priority), {} pending",
                    job_id,
                    priority,
                    depth
                );
                #[cfg(feature = "tracing")]
                crate::telemetry::metrics::record_submission(priority, depth);
                Ok(())
            }
            Err(_) => Err(PoolError::queue_closed(job_id.0)),
        }
    }

    /// Submit every job in order, stopping at the first rejection.
    ///
    /// Returns the number of jobs accepted.
    pub fn submit_batch<I>(&self, jobs: I) -> Result<usize>
    where
        I: IntoIterator<Item = Job>,
    {
        let mut count = 0;
        for job in jobs {
            self.submit(job)?;
            count += 1;
        }
        Ok(count)
    }

    /// Stop using the configured [`ShutdownPolicy`]
    pub fn stop(&self) -> Result<StopReport> {
        self.stop_with(self.config.shutdown_policy)
    }

    /// Stop accepting jobs, execute everything already submitted, then wait
    /// for every worker to exit. The result stream ends once its buffer is read.
    pub fn stop_and_drain(&self) -> Result<StopReport> {
        self.stop_with(ShutdownPolicy::Drain)
    }

    /// Stop accepting jobs and abandon the ones still pending. Jobs already in
    /// the job channel are executed before the workers exit.
    pub fn stop_immediate(&self) -> Result<StopReport> {
        self.stop_with(ShutdownPolicy::Discard)
    }

    fn stop_with(&self, policy: ShutdownPolicy) -> Result<StopReport> {
        let _lifecycle = self.lifecycle.lock();

        if let Err(actual) = self.state.compare_exchange(
            PoolState::Running as u8,
            PoolState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(PoolError::not_running(
                self.name(),
                PoolState::from_u8(actual),
            ));
        }
        log::info!("Worker pool '{}' stopping ({:?})", self.name(), policy);

        match policy {
            ShutdownPolicy::Drain => self.pending.close(),
            ShutdownPolicy::Discard => {
                self.discard_pending();
            }
        }

        let mut first_error = None;

        // Dispatcher exit closes the job channel
        if let Some(dispatcher) = self.dispatcher.lock().take() {
            if let Err(e) = dispatcher.join() {
                log::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(wait_group) = self.wait_group.lock().take() {
            wait_group.wait();
        }
        let workers = std::mem::take(&mut *self.workers.write());
        for worker in workers {
            if let Err(e) = worker.join() {
                log::error!("{}", e);
                first_error.get_or_insert(e);
            }
        }

        self.set_state(PoolState::Stopped);

        // Counted after the dispatcher exits so jobs it abandoned are included
        let report = StopReport {
            policy,
            discarded: self.total_discarded(),
            jobs_done: self.total_jobs_done(),
            results_dropped: self.results.dropped(),
        };
        log::info!(
            "Worker pool '{}' stopped: {} jobs done, {} discarded, {} results dropped",
            self.name(),
            report.jobs_done,
            report.discarded,
            report.results_dropped
        );
        #[cfg(feature = "tracing")]
        crate::telemetry::metrics::record_pool_shutdown(
            report.jobs_done,
            self.total_jobs_failed(),
            report.discarded,
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    /// Jobs waiting in the pending queue, not yet dispatched
    pub fn queue_len(&self) -> usize {
        self.pending.len()
    }

    /// Per-worker statistics. Still available after stop.
    pub fn worker_stats(&self) -> Vec<WorkerStatsSnapshot> {
        self.stats.read().iter().map(|s| s.snapshot()).collect()
    }

    /// A receiver over the result stream.
    ///
    /// Every clone competes for the same outcomes. Iteration ends after the
    /// pool has stopped and the buffer is empty.
    pub fn results(&self) -> ResultStream {
        self.results.clone()
    }

    /// Pool-wide counters.
    ///
    /// Read field by field without a global lock, so a snapshot taken while
    /// running may be slightly inconsistent. After stop it is exact.
    pub fn stats(&self) -> PoolStats {
        let stats = self.stats.read();
        PoolStats {
            state: self.state(),
            submitted: self.submitted.load(Ordering::Relaxed),
            dispatched: self.dispatch.dispatched.load(Ordering::Relaxed),
            discarded: self.total_discarded(),
            pending: self.pending.len(),
            jobs_done: stats.iter().map(|s| s.get_jobs_done()).sum(),
            jobs_failed: stats.iter().map(|s| s.get_jobs_failed()).sum(),
            results_dropped: self.results.dropped(),
            busy_workers: stats.iter().filter(|s| s.is_busy()).count(),
        }
    }

    /// Aggregated per-priority counters
    #[cfg(feature = "metrics")]
    pub fn priority_metrics(&self) -> Arc<PriorityMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        PoolState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Number of worker threads
    pub fn num_workers(&self) -> usize {
        self.config.num_workers
    }

    /// Whether the pool is running
    pub fn is_running(&self) -> bool {
        self.state() == PoolState::Running
    }

    /// The configuration this pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn name(&self) -> &str {
        &self.config.thread_name_prefix
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Close the pending queue and drop what it holds, logging each job
    fn discard_pending(&self) -> u64 {
        let abandoned = self.pending.close_and_discard();
        for job in &abandoned {
            log::warn!(
                "discarding job {} ({} priority): {}",
                job.id,
                job.priority,
                job.source.display()
            );
        }
        let count = abandoned.len() as u64;
        self.discarded.fetch_add(count, Ordering::Relaxed);
        count
    }

    fn total_discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
            + self.dispatch.undeliverable.load(Ordering::Relaxed)
    }

    fn total_jobs_done(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_jobs_done()).sum()
    }

    #[cfg(feature = "tracing")]
    fn total_jobs_failed(&self) -> u64 {
        self.stats.read().iter().map(|s| s.get_jobs_failed()).sum()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        match self.state() {
            PoolState::Running => {
                if let Err(e) = self.stop() {
                    log::error!(
                        "Failed to stop worker pool '{}' during drop: {}",
                        self.name(),
                        e
                    );
                }
            }
            PoolState::Created if !self.pending.is_empty() => {
                let discarded = self.discard_pending();
                log::warn!(
                    "Worker pool '{}' dropped before start, {} held jobs discarded",
                    self.name(),
                    discarded
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JobError, JobId, Priority};
    use crate::queue::JobOutcome;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::{Duration, Instant};

    fn job(id: u64, priority: Priority) -> Job {
        Job::new(
            JobId(id),
            priority,
            format!("in/img_{:04}.jpg", id),
            format!("out/img_{:04}.png", id),
        )
    }

    fn instant(_: &Job) -> std::result::Result<Duration, JobError> {
        Ok(Duration::ZERO)
    }

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::new(4, 16).expect("Failed to create pool");
        assert_eq!(pool.num_workers(), 4);
        assert_eq!(pool.state(), PoolState::Created);
        assert!(!pool.is_running());
        assert!(pool.worker_stats().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = WorkerPool::new(2, 0);
        assert!(matches!(result, Err(PoolError::InvalidConfig { .. })));
    }

    #[test]
    fn test_start_and_drain() {
        let pool = WorkerPool::new(2, 4).expect("Failed to create pool");
        pool.start(instant).expect("Failed to start pool");
        assert!(pool.is_running());

        let accepted = pool
            .submit_batch((1..=10).map(|id| job(id, Priority::Mid)))
            .expect("Failed to submit");
        assert_eq!(accepted, 10);

        let report = pool.stop_and_drain().expect("Failed to stop pool");
        assert_eq!(report.jobs_done, 10);
        assert_eq!(report.discarded, 0);
        assert_eq!(pool.state(), PoolState::Stopped);

        let stats = pool.stats();
        assert_eq!(stats.submitted, 10);
        assert_eq!(stats.dispatched, 10);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.busy_workers, 0);
    }

    #[test]
    fn test_held_jobs_run_in_priority_order() {
        let pool = WorkerPool::new(1, 8).expect("Failed to create pool");
        pool.submit(job(1, Priority::Low)).unwrap();
        pool.submit(job(2, Priority::High)).unwrap();
        pool.submit(job(3, Priority::Mid)).unwrap();
        pool.submit(job(4, Priority::High)).unwrap();
        assert_eq!(pool.queue_len(), 4);

        pool.start(instant).expect("Failed to start pool");
        pool.stop_and_drain().expect("Failed to stop pool");

        let order: Vec<u64> = pool.results().iter().map(|o| o.job_id.0).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_start_twice_fails() {
        let pool = WorkerPool::new(1, 1).expect("Failed to create pool");
        pool.start(instant).expect("Failed to start pool");
        assert!(matches!(
            pool.start(instant),
            Err(PoolError::AlreadyStarted {
                state: PoolState::Running,
                ..
            })
        ));
        pool.stop().unwrap();
        assert!(matches!(
            pool.start(instant),
            Err(PoolError::AlreadyStarted {
                state: PoolState::Stopped,
                ..
            })
        ));
    }

    #[test]
    fn test_stop_misuse() {
        let pool = WorkerPool::new(1, 1).expect("Failed to create pool");
        assert!(matches!(
            pool.stop(),
            Err(PoolError::NotRunning {
                state: PoolState::Created,
                ..
            })
        ));

        pool.start(instant).unwrap();
        pool.stop().unwrap();
        assert!(matches!(
            pool.stop_immediate(),
            Err(PoolError::NotRunning {
                state: PoolState::Stopped,
                ..
            })
        ));
        assert!(matches!(
            pool.submit(job(1, Priority::High)),
            Err(PoolError::NotRunning { .. })
        ));
    }

    #[test]
    fn test_stop_immediate_discards_pending() {
        let release = Arc::new(AtomicBool::new(false));
        let release_clone = Arc::clone(&release);
        let config = PoolConfig::new(1).with_channel_capacity(1);
        let pool = WorkerPool::with_config(config).expect("Failed to create pool");

        pool.start(move |_: &Job| {
            while !release_clone.load(Ordering::Acquire) {
                thread::sleep(Duration::from_millis(1));
            }
            Ok::<_, JobError>(Duration::ZERO)
        })
        .unwrap();

        for id in 1..=10 {
            pool.submit(job(id, Priority::Low)).unwrap();
        }
        // One job executing, one buffered, one held by the blocked dispatcher
        let deadline = Instant::now() + Duration::from_secs(5);
        while pool.queue_len() > 7 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let stopper = {
            let release = Arc::clone(&release);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                release.store(true, Ordering::Release);
            })
        };
        let report = pool.stop_immediate().expect("Failed to stop pool");
        stopper.join().unwrap();

        assert_eq!(report.policy, ShutdownPolicy::Discard);
        assert!(report.discarded > 0);
        assert_eq!(report.jobs_done + report.discarded, 10);
        assert_eq!(pool.stats().discarded, report.discarded);
    }

    #[test]
    fn test_results_stream_ends_after_stop() {
        let pool = WorkerPool::new(3, 2).expect("Failed to create pool");
        let results = pool.results();
        pool.start(instant).unwrap();
        for id in 1..=6 {
            pool.submit(job(id, Priority::High)).unwrap();
        }
        pool.stop_and_drain().unwrap();

        let outcomes: Vec<JobOutcome> = results.iter().collect();
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(JobOutcome::is_success));
        assert!(results.recv().is_none());
    }

    #[test]
    fn test_worker_stats_survive_stop() {
        let pool = WorkerPool::new(2, 8).expect("Failed to create pool");
        pool.start(instant).unwrap();
        pool.submit_batch((1..=4).map(|id| job(id, Priority::High)))
            .unwrap();
        pool.stop().unwrap();

        let stats = pool.worker_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(stats.iter().map(|s| s.jobs_done).sum::<u64>(), 4);
        assert_eq!(
            stats.iter().map(|s| s.high_priority_jobs).sum::<u64>(),
            4
        );
    }

    #[test]
    fn test_drop_stops_running_pool() {
        let done = Arc::new(AtomicU64::new(0));
        let done_clone = Arc::clone(&done);
        {
            let pool = WorkerPool::new(2, 4).expect("Failed to create pool");
            pool.start(move |_: &Job| {
                done_clone.fetch_add(1, Ordering::Relaxed);
                Ok::<_, JobError>(Duration::ZERO)
            })
            .unwrap();
            for id in 1..=5 {
                pool.submit(job(id, Priority::Mid)).unwrap();
            }
        }
        assert_eq!(done.load(Ordering::Relaxed), 5);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_priority_metrics() {
        let pool = WorkerPool::new(2, 8).expect("Failed to create pool");
        pool.start(|job: &Job| {
            if job.priority == Priority::Low {
                Err(JobError::failed("nope"))
            } else {
                Ok(Duration::ZERO)
            }
        })
        .unwrap();
        pool.submit(job(1, Priority::High)).unwrap();
        pool.submit(job(2, Priority::Low)).unwrap();
        pool.submit(job(3, Priority::Low)).unwrap();
        pool.stop().unwrap();

        let rows = pool.priority_metrics().snapshot();
        assert_eq!(rows[0].converted, 1);
        assert_eq!(rows[2].failed, 2);
        assert_eq!(pool.stats().jobs_failed, 2);
    }

    #[test]
    fn test_drop_before_start_discards_held_jobs() {
        let pool = WorkerPool::new(1, 4).expect("Failed to create pool");
        for id in 1..=5 {
            pool.submit(job(id, Priority::Low)).unwrap();
        }
        assert_eq!(pool.queue_len(), 5);
        let pending = Arc::clone(&pool.pending);

        drop(pool);

        assert!(pending.is_empty());
        assert!(pending.is_closed());
    }

    #[test]
    fn test_discard_pending_counts_held_jobs() {
        let pool = WorkerPool::new(1, 4).expect("Failed to create pool");
        pool.submit_batch((1..=3).map(|id| job(id, Priority::Mid)))
            .unwrap();

        assert_eq!(pool.discard_pending(), 3);
        assert_eq!(pool.stats().discarded, 3);
        assert!(matches!(
            pool.submit(job(4, Priority::Mid)),
            Err(PoolError::QueueClosed { .. })
        ));
    }

    #[test]
    fn test_stop_report_and_stats_agree_on_discards() {
        let pool = WorkerPool::new(1, 4).expect("Failed to create pool");
        pool.start(instant).unwrap();
        // Jobs the dispatcher could not hand to any worker
        pool.dispatch.undeliverable.store(2, Ordering::Relaxed);

        let report = pool.stop_and_drain().unwrap();
        assert_eq!(report.discarded, 2);
        assert_eq!(pool.stats().discarded, report.discarded);
    }
}
