//! Worker pool, dispatcher and worker implementations

pub mod config;
mod dispatcher;
pub mod worker;
pub mod worker_pool;

pub use config::{
    PoolConfig, PoolState, ShutdownPolicy, DEFAULT_CHANNEL_CAPACITY, DEFAULT_DISPATCH_INTERVAL,
    DEFAULT_RESULT_CAPACITY,
};
pub use worker::{Worker, WorkerStats, WorkerStatsSnapshot};
pub use worker_pool::{PoolStats, StopReport, WorkerPool};
