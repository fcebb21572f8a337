//! Batch planning and the sequential baseline

use crate::core::{Converter, ImageFormat, Job, JobId, PoolError, PriorityPolicy, Quality, Result};
use crate::fs_utils::{list_files, stat_file};
use crate::queue::{JobOutcome, OutcomeStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Turns every regular file in `input_dir` into a conversion job.
///
/// Files are taken in name order. The n-th file gets id `n` and destination
/// `output_dir/img_NNNN.<ext>`; its priority comes from `policy` applied to
/// its modification time. Files that cannot be stat'ed are logged and
/// skipped without shifting the numbering of later files.
pub fn plan_jobs(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    format: ImageFormat,
    quality: Quality,
    policy: &PriorityPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<Job>> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    let files = list_files(input_dir).map_err(|e| PoolError::io(input_dir, e))?;

    let mut jobs = Vec::with_capacity(files.len());
    for (index, source) in files.into_iter().enumerate() {
        let id = index as u64 + 1;
        let metadata = match stat_file(&source) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Error stating {}: {}", source.display(), e);
                continue;
            }
        };

        let destination = output_dir.join(format!("img_{:04}.{}", id, format.extension()));
        let priority = policy.priority_for(metadata.modified, now);
        jobs.push(
            Job::new(JobId(id), priority, source, destination)
                .with_format(format)
                .with_quality(quality)
                .with_source_metadata(metadata.modified, metadata.size),
        );
    }
    Ok(jobs)
}

/// Result of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Jobs attempted
    pub total: usize,
    /// Successful conversions
    pub converted: usize,
    /// Failed conversions
    pub failed: usize,
    /// Wall time of the whole batch
    pub elapsed: Duration,
    /// One outcome per job, in execution order
    pub outcomes: Vec<JobOutcome>,
}

impl BatchSummary {
    /// Successful conversions per second of wall time
    pub fn images_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.converted as f64 / secs
        }
    }
}

/// Converts jobs one after another on the calling thread, in the given
/// order. Used as the baseline the pool is measured against.
///
/// Outcomes carry worker id 0, meaning the caller's thread.
pub fn run_sequential(jobs: Vec<Job>, converter: &dyn Converter) -> BatchSummary {
    let start = Instant::now();
    let total = jobs.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, job) in jobs.into_iter().enumerate() {
        let job_start = Instant::now();
        let result = converter.convert(&job);
        let elapsed = job_start.elapsed();

        let status = match result {
            Ok(duration) => {
                log::debug!(
                    "[{}/{}] {} -> {} ({} priority, {:?})",
                    index + 1,
                    total,
                    job.source.display(),
                    job.destination.display(),
                    job.priority,
                    duration
                );
                OutcomeStatus::Converted { duration }
            }
            Err(e) => {
                log::warn!("Error processing {}: {}", job.source.display(), e);
                OutcomeStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        outcomes.push(JobOutcome {
            worker_id: 0,
            job_id: job.id,
            priority: job.priority,
            source: job.source,
            destination: job.destination,
            elapsed,
            status,
        });

        if (index + 1) % 10 == 0 {
            log::info!("Progress: {}/{}", index + 1, total);
        }
    }

    let converted = outcomes.iter().filter(|o| o.is_success()).count();
    BatchSummary {
        total,
        converted,
        failed: total - converted,
        elapsed: start.elapsed(),
        outcomes,
    }
}
