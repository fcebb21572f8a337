//! Convenient re-exports for common types and traits

pub use crate::convert::ImageConverter;
pub use crate::core::{
    Converter, ImageFormat, Job, JobError, JobId, PoolError, Priority, PriorityPolicy, Quality,
    Result,
};
pub use crate::pool::{
    PoolConfig, PoolState, PoolStats, ShutdownPolicy, StopReport, WorkerPool, WorkerStatsSnapshot,
};
pub use crate::queue::{JobOutcome, ResultStream};
