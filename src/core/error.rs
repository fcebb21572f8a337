//! Error types for the worker pool and for job execution

use crate::pool::PoolState;
use std::path::PathBuf;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors surfaced to callers of the pool.
///
/// Only pool misuse and setup failures end up here. A failing conversion is a
/// [`JobError`], reported through the result stream and never returned from a
/// pool method.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// `start` was called on a pool that already left the `Created` state
    #[error("Worker pool '{pool_name}' was already started (state: {state})")]
    AlreadyStarted {
        /// Name of the pool
        pool_name: String,
        /// State the pool was in
        state: PoolState,
    },

    /// Operation requires a running pool
    #[error("Worker pool '{pool_name}' is not running (state: {state})")]
    NotRunning {
        /// Name of the pool
        pool_name: String,
        /// State the pool was in
        state: PoolState,
    },

    /// The pending queue stopped accepting jobs while the submission was in flight
    #[error("Pending queue is closed, job {job_id} rejected")]
    QueueClosed {
        /// ID of the rejected job
        job_id: u64,
    },

    /// Failed to spawn a worker or dispatcher thread
    #[error("Failed to spawn thread '{thread_name}': {message}")]
    SpawnError {
        /// Name of the thread that failed to spawn
        thread_name: String,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// A pool thread panicked outside job execution
    #[error("Failed to join thread '{thread_name}': {message}")]
    JoinError {
        /// Name of the thread that failed to join
        thread_name: String,
        /// Error message
        message: String,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Filesystem error while planning a batch
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Image encode failure while generating test input
    #[error("Image error on {}: {source}", .path.display())]
    Image {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: image::ImageError,
    },
}

impl PoolError {
    /// Create an already started error
    pub fn already_started(pool_name: impl Into<String>, state: PoolState) -> Self {
        PoolError::AlreadyStarted {
            pool_name: pool_name.into(),
            state,
        }
    }

    /// Create a not running error
    pub fn not_running(pool_name: impl Into<String>, state: PoolState) -> Self {
        PoolError::NotRunning {
            pool_name: pool_name.into(),
            state,
        }
    }

    /// Create a queue closed error
    pub fn queue_closed(job_id: u64) -> Self {
        PoolError::QueueClosed { job_id }
    }

    /// Create a spawn error with source
    pub fn spawn(thread_name: impl Into<String>, source: std::io::Error) -> Self {
        PoolError::SpawnError {
            thread_name: thread_name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a join error
    pub fn join(thread_name: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::JoinError {
            thread_name: thread_name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PoolError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an image error bound to a path
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        PoolError::Image {
            path: path.into(),
            source,
        }
    }
}

/// Failure of the external work function for a single job.
///
/// Workers turn this into a failed [`JobOutcome`](crate::queue::JobOutcome);
/// it never unwinds the pool.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JobError {
    /// Filesystem error
    #[error("{context}: {source}")]
    Io {
        /// What was being done
        context: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Decode or encode failure
    #[error("{context}: {source}")]
    Image {
        /// What was being done
        context: String,
        /// Underlying error
        #[source]
        source: image::ImageError,
    },

    /// The converter panicked
    #[error("converter panicked: {0}")]
    Panicked(String),

    /// Any other failure reported by a converter
    #[error("{0}")]
    Failed(String),
}

impl JobError {
    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        JobError::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an image codec error with context
    pub fn image(context: impl Into<String>, source: image::ImageError) -> Self {
        JobError::Image {
            context: context.into(),
            source,
        }
    }

    /// Create a generic failure
    pub fn failed<S: Into<String>>(msg: S) -> Self {
        JobError::Failed(msg.into())
    }
}
