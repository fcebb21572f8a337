//! Priority levels and the pending-job heap
//!
//! Lower numeric value means higher urgency: [`Priority::High`] dispatches
//! before [`Priority::Mid`], which dispatches before [`Priority::Low`].

use super::job::Job;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Job priority levels (lower number = dispatched first)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Dispatched first
    High = 1,
    /// Between high and low
    Mid = 2,
    /// Dispatched last
    #[default]
    Low = 3,
}

impl Priority {
    /// All priorities in dispatch order
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Mid, Priority::Low];

    /// Get the numeric value of the priority
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Zero-based bucket index, used for per-priority counters
    pub(crate) fn index(&self) -> usize {
        self.value() as usize - 1
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Mid => write!(f, "mid"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Age-based priority policy: the older the source file, the sooner it is
/// converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityPolicy {
    /// Files older than this are [`Priority::High`]
    pub high_after: Duration,
    /// Files older than this (and not high) are [`Priority::Mid`]
    pub mid_after: Duration,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            high_after: Duration::days(365),
            mid_after: Duration::days(30),
        }
    }
}

impl PriorityPolicy {
    /// Classify a file by its modification time relative to `now`
    pub fn priority_for(&self, modified: DateTime<Utc>, now: DateTime<Utc>) -> Priority {
        let age = now.signed_duration_since(modified);
        if age > self.high_after {
            Priority::High
        } else if age > self.mid_after {
            Priority::Mid
        } else {
            Priority::Low
        }
    }
}

/// A job waiting in the heap, tagged with its arrival order
#[derive(Debug)]
pub(crate) struct PendingJob {
    pub(crate) job: Job,
    /// Sequence number for FIFO ordering within same priority
    pub(crate) sequence: u64,
}

impl PartialEq for PendingJob {
    fn eq(&self, other: &Self) -> bool {
        self.job.priority == other.job.priority && self.sequence == other.sequence
    }
}

impl Eq for PendingJob {}

impl PartialOrd for PendingJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: the smallest (priority, sequence) must compare greatest
        other
            .job
            .priority
            .cmp(&self.job.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of pending jobs keyed by priority, FIFO among equals.
///
/// Not synchronized; [`PendingQueue`](crate::queue::PendingQueue) owns it
/// behind a mutex.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<PendingJob>,
    next_sequence: u64,
}

impl PriorityQueue {
    /// Create a new empty priority queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new priority queue with the specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    /// Push a job onto the queue
    pub fn push(&mut self, job: Job) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(PendingJob { job, sequence });
    }

    /// Pop the most urgent job, oldest first among equal priorities
    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|pending| pending.job)
    }

    /// Priority of the job `pop` would return
    pub fn peek_priority(&self) -> Option<Priority> {
        self.heap.peek().map(|pending| pending.job.priority)
    }

    /// Get the number of jobs in the queue
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove every job, returned in dispatch order
    pub fn drain(&mut self) -> Vec<Job> {
        let mut jobs = Vec::with_capacity(self.heap.len());
        while let Some(job) = self.pop() {
            jobs.push(job);
        }
        jobs
    }
}
