//! Core types and traits for the worker pool

pub mod error;
pub mod job;
pub mod priority;

pub use error::{JobError, PoolError, Result};
pub use job::{Converter, ImageFormat, Job, JobId, Quality};
pub use priority::{Priority, PriorityPolicy, PriorityQueue};
