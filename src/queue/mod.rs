//! Queues between submitters, the dispatcher, workers and observers.
//!
//! - [`PendingQueue`]: priority heap behind a mutex, fed by `submit` and
//!   drained by the dispatcher
//! - [`ResultSink`] / [`ResultStream`]: bounded, drop-on-full outcome channel
//!
//! The bounded job channel between the dispatcher and workers is a plain
//! `crossbeam_channel` owned by [`WorkerPool`](crate::pool::WorkerPool).

mod pending;
mod results;

pub use pending::{NextJob, PendingQueue};
pub use results::{result_channel, JobOutcome, OutcomeStatus, ResultSink, ResultStream};
