//! Lock-guarded pending queue shared by submitters and the dispatcher.

use crate::core::{Job, PriorityQueue};
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// What the dispatcher got from [`PendingQueue::next_timeout`]
#[derive(Debug)]
pub enum NextJob {
    /// The most urgent pending job
    Job(Job),
    /// Nothing arrived within the wait interval
    Empty,
    /// The queue is closed and fully drained
    Closed,
}

#[derive(Debug, Default)]
struct Inner {
    heap: PriorityQueue,
    closed: bool,
}

/// The priority heap behind a mutex, with a condition variable that
/// [`push`](Self::push) signals so the dispatcher does not have to spin.
///
/// The lock is held only for push, or pop plus length check. The closed flag
/// lives under the same lock, so a push either lands before `close` or is
/// handed back to the caller.
///
/// # Example
///
/// ```rust
/// use image_batch_pool::core::{Job, JobId, Priority};
/// use image_batch_pool::queue::{NextJob, PendingQueue};
/// use std::time::Duration;
///
/// let queue = PendingQueue::new();
/// queue.push(Job::new(JobId(1), Priority::Low, "a.jpg", "a.png")).unwrap();
/// queue.push(Job::new(JobId(2), Priority::High, "b.jpg", "b.png")).unwrap();
///
/// match queue.next_timeout(Duration::from_millis(10)) {
///     NextJob::Job(job) => assert_eq!(job.id, JobId(2)),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Default)]
pub struct PendingQueue {
    inner: Mutex<Inner>,
    available: Condvar,
}

impl PendingQueue {
    /// Creates a new empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a job and wakes the dispatcher.
    ///
    /// Returns the job back if the queue has been closed.
    pub fn push(&self, job: Job) -> Result<usize, Job> {
        let depth = {
            let mut guard = self.inner.lock();
            if guard.closed {
                return Err(job);
            }
            guard.heap.push(job);
            guard.heap.len()
        };
        self.available.notify_one();
        Ok(depth)
    }

    /// Pops the most urgent job, waiting up to `timeout` if none is pending.
    pub fn next_timeout(&self, timeout: Duration) -> NextJob {
        let mut guard = self.inner.lock();

        if let Some(job) = guard.heap.pop() {
            return NextJob::Job(job);
        }
        if guard.closed {
            return NextJob::Closed;
        }

        self.available.wait_for(&mut guard, timeout);

        if let Some(job) = guard.heap.pop() {
            return NextJob::Job(job);
        }
        if guard.closed {
            return NextJob::Closed;
        }
        NextJob::Empty
    }

    /// Stops accepting jobs. Already queued jobs stay and are still handed out.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.available.notify_all();
    }

    /// Stops accepting jobs and removes everything still queued.
    pub fn close_and_discard(&self) -> Vec<Job> {
        let discarded = {
            let mut guard = self.inner.lock();
            guard.closed = true;
            guard.heap.drain()
        };
        self.available.notify_all();
        discarded
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Number of pending jobs
    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    /// Whether no jobs are pending
    pub fn is_empty(&self) -> bool {
        self.inner.lock().heap.is_empty()
    }
}
