//! Per-priority aggregated metrics.
//!
//! Enabled by the default `metrics` feature. Every worker records into one
//! shared [`PriorityMetrics`]; [`PriorityMetrics::snapshot`] turns the
//! aggregate into plain [`PrioritySummary`] rows for reporting.

use crate::core::Priority;
use crate::pool::worker::mean;
use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    converted: u64,
    failed: u64,
    total_time: Duration,
    max_time: Duration,
}

/// Thread-safe per-priority counters
#[derive(Debug, Default)]
pub struct PriorityMetrics {
    by_priority: DashMap<Priority, Counters>,
}

impl PriorityMetrics {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished job.
    pub fn record(&self, priority: Priority, elapsed: Duration, success: bool) {
        let mut counters = self.by_priority.entry(priority).or_default();
        if success {
            counters.converted += 1;
        } else {
            counters.failed += 1;
        }
        counters.total_time += elapsed;
        counters.max_time = counters.max_time.max(elapsed);
    }

    /// Jobs finished at `priority`, failures included
    pub fn jobs_at(&self, priority: Priority) -> u64 {
        self.by_priority
            .get(&priority)
            .map(|c| c.converted + c.failed)
            .unwrap_or(0)
    }

    /// One row per priority, in dispatch order. Priorities with no finished
    /// jobs are included with zero counts.
    pub fn snapshot(&self) -> Vec<PrioritySummary> {
        Priority::ALL
            .iter()
            .map(|&priority| {
                let counters = self
                    .by_priority
                    .get(&priority)
                    .map(|c| *c)
                    .unwrap_or_default();
                let jobs = counters.converted + counters.failed;
                PrioritySummary {
                    priority,
                    converted: counters.converted,
                    failed: counters.failed,
                    average_time: mean(counters.total_time, jobs),
                    max_time: counters.max_time,
                }
            })
            .collect()
    }
}

/// Aggregate for one priority level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritySummary {
    /// Priority level
    pub priority: Priority,
    /// Successful conversions
    pub converted: u64,
    /// Failed or panicked conversions
    pub failed: u64,
    /// Mean wall time per job
    pub average_time: Duration,
    /// Slowest job
    pub max_time: Duration,
}
