//! # Image Batch Pool
//!
//! A priority worker pool for batch image conversion.
//!
//! ## Features
//!
//! - **Priority dispatch**: a lock-guarded heap feeds a single dispatcher;
//!   the most urgent pending job always goes out first, ties in FIFO order
//! - **Backpressure**: the dispatcher blocks on a bounded job channel,
//!   `submit` never does
//! - **Failure isolation**: converter errors and panics become failed outcomes,
//!   the worker keeps going
//! - **Observability**: per-worker statistics, a best-effort result stream,
//!   per-priority metrics (`metrics` feature) and `tracing` events
//!   (`tracing` feature)
//! - **Explicit shutdown**: drain everything or discard what is still pending
//!
//! ## Quick Start
//!
//! ```rust
//! use image_batch_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(4, 100)?;
//! pool.start(|job: &Job| {
//!     // decode job.source, encode job.destination...
//!     Ok::<_, JobError>(Duration::from_millis(1))
//! })?;
//!
//! for id in 1..=10 {
//!     let priority = if id % 3 == 0 { Priority::High } else { Priority::Low };
//!     pool.submit(Job::new(JobId(id), priority, "in.jpg", "out.png"))?;
//! }
//!
//! let report = pool.stop_and_drain()?;
//! assert_eq!(report.jobs_done, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting a directory
//!
//! ```rust,no_run
//! use image_batch_pool::batch::plan_jobs;
//! use image_batch_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let jobs = plan_jobs(
//!     "input",
//!     "output",
//!     ImageFormat::Png,
//!     Quality::DEFAULT,
//!     &PriorityPolicy::default(),
//!     chrono::Utc::now(),
//! )?;
//!
//! let pool = WorkerPool::with_config(PoolConfig::new(4).with_channel_capacity(8))?;
//! pool.submit_batch(jobs)?;
//! pool.start(ImageConverter::new())?;
//!
//! let results = pool.results();
//! pool.stop()?;
//! for outcome in results {
//!     println!("{}", outcome);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod convert;
pub mod core;
pub mod fs_utils;
pub mod generator;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod pool;
pub mod prelude;
pub mod queue;
#[cfg(feature = "tracing")]
pub mod telemetry;

pub use crate::convert::ImageConverter;
pub use crate::core::{Converter, Job, JobError, JobId, PoolError, Priority, Result};
pub use crate::pool::{PoolConfig, WorkerPool, WorkerStats};
