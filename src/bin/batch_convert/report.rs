use std::time::Duration;

#[cfg(feature = "metrics")]
use image_batch_pool::metrics::PrioritySummary;
use image_batch_pool::batch::BatchSummary;
use image_batch_pool::prelude::*;
use serde::Serialize;

use crate::args::Mode;

/// Final numbers of one `run`, printed as text or JSON.
#[derive(Debug, Serialize)]
pub(crate) struct RunReport {
    pub(crate) mode: Mode,
    pub(crate) total_files: usize,
    pub(crate) converted: u64,
    pub(crate) failed: u64,
    pub(crate) elapsed: Duration,
    pub(crate) images_per_second: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pool: Option<PoolStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stop: Option<StopReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) workers: Vec<WorkerStatsSnapshot>,
    #[cfg(feature = "metrics")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) priorities: Vec<PrioritySummary>,
}

// Converted images per second; failures do not count
fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        count as f64 / secs
    }
}

impl RunReport {
    pub(crate) fn sequential(summary: BatchSummary, elapsed: Duration) -> Self {
        Self {
            mode: Mode::Sync,
            total_files: summary.total,
            converted: summary.converted as u64,
            failed: summary.failed as u64,
            elapsed,
            images_per_second: rate(summary.converted as u64, elapsed),
            pool: None,
            stop: None,
            workers: Vec::new(),
            #[cfg(feature = "metrics")]
            priorities: Vec::new(),
        }
    }

    pub(crate) fn pool(
        pool: &WorkerPool,
        stop: StopReport,
        total_files: usize,
        elapsed: Duration,
    ) -> Self {
        let stats = pool.stats();
        let converted = stats.jobs_done - stats.jobs_failed;
        Self {
            mode: Mode::Pool,
            total_files,
            converted,
            failed: stats.jobs_failed,
            elapsed,
            images_per_second: rate(converted, elapsed),
            pool: Some(stats),
            stop: Some(stop),
            workers: pool.worker_stats(),
            #[cfg(feature = "metrics")]
            priorities: pool.priority_metrics().snapshot(),
        }
    }

    pub(crate) fn print(&self) {
        if !self.workers.is_empty() {
            println!("\n=== WORKER STATISTICS ===");
            for worker in &self.workers {
                println!(
                    "Worker #{}: jobs={}, avg_time={:?}, high={}, mid={}, low={}",
                    worker.id,
                    worker.jobs_done,
                    worker.average_execution_time(),
                    worker.high_priority_jobs,
                    worker.mid_priority_jobs,
                    worker.low_priority_jobs
                );
            }
            let total: u64 = self.workers.iter().map(|w| w.jobs_done).sum();
            println!("\nTotal jobs processed: {}", total);
        }

        #[cfg(feature = "metrics")]
        if !self.priorities.is_empty() {
            println!("\n=== PRIORITIES ===");
            for row in &self.priorities {
                println!(
                    "{:>4}: converted={}, failed={}, avg_time={:?}, max_time={:?}",
                    row.priority.to_string(),
                    row.converted,
                    row.failed,
                    row.average_time,
                    row.max_time
                );
            }
        }

        println!("\n=== FINAL RESULTS ===");
        println!("Total time: {:?}", self.elapsed);
        println!("Total files: {}", self.total_files);
        println!("Processed: {}/{}", self.converted, self.total_files);
        if self.failed > 0 {
            println!("Failed: {}", self.failed);
        }
        if let Some(stop) = &self.stop {
            if stop.results_dropped > 0 {
                println!("Results dropped: {}", stop.results_dropped);
            }
        }
        println!("Speed: {:.2} images/second", self.images_per_second);
    }
}
