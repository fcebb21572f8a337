//! Worker pool configuration and lifecycle state

use crate::core::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default bound of the dispatcher-to-worker channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
/// Default bound of the result stream
pub const DEFAULT_RESULT_CAPACITY: usize = 1000;
/// Default upper bound on how long an idle dispatcher waits before rechecking
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_millis(10);

/// What happens to jobs still in the pending queue when the pool stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Dispatch and execute every pending job before the workers exit
    #[default]
    Drain,
    /// Drop pending jobs without executing them. Jobs already in the job
    /// channel still run.
    Discard,
}

/// Lifecycle of a [`WorkerPool`](super::WorkerPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PoolState {
    /// Constructed, no threads yet. Submissions are held until `start`.
    Created = 0,
    /// Workers and dispatcher running
    Running = 1,
    /// `stop` in progress
    Stopping = 2,
    /// Every worker has exited
    Stopped = 3,
}

impl PoolState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => PoolState::Created,
            1 => PoolState::Running,
            2 => PoolState::Stopping,
            _ => PoolState::Stopped,
        }
    }
}

impl fmt::Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolState::Created => "created",
            PoolState::Running => "running",
            PoolState::Stopping => "stopping",
            PoolState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Configuration for a worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads (0 = number of CPUs)
    pub num_workers: usize,
    /// Bound of the channel between dispatcher and workers.
    ///
    /// Priority order is only enforced among jobs still in the pending queue;
    /// once a job is in this buffer it cannot be overtaken. Smaller values
    /// keep more jobs visible to the priority queue.
    pub channel_capacity: usize,
    /// Bound of the result stream. Outcomes beyond it are dropped and counted.
    pub result_capacity: usize,
    /// Longest time an idle dispatcher sleeps before rechecking the queue.
    /// Submissions wake it earlier.
    pub dispatch_interval: Duration,
    /// Thread name prefix, also used as the pool name in errors
    pub thread_name_prefix: String,
    /// Policy applied by [`WorkerPool::stop`](super::WorkerPool::stop)
    pub shutdown_policy: ShutdownPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            result_capacity: DEFAULT_RESULT_CAPACITY,
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
            thread_name_prefix: "worker".to_string(),
            shutdown_policy: ShutdownPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with specified number of workers
    #[must_use]
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers: if num_workers == 0 {
                num_cpus::get()
            } else {
                num_workers
            },
            ..Default::default()
        }
    }

    /// Set the dispatcher-to-worker channel bound
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the result stream bound
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    /// Set the idle dispatcher wait interval.
    ///
    /// # Panics
    ///
    /// Panics if interval is zero.
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        assert!(!interval.is_zero(), "dispatch interval must be non-zero");
        self.dispatch_interval = interval;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the policy used by `stop`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(PoolError::invalid_config(
                "num_workers",
                "Number of workers must be greater than 0",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(PoolError::invalid_config(
                "channel_capacity",
                "Channel capacity must be greater than 0",
            ));
        }
        if self.result_capacity == 0 {
            return Err(PoolError::invalid_config(
                "result_capacity",
                "Result capacity must be greater than 0",
            ));
        }
        if self.dispatch_interval.is_zero() {
            return Err(PoolError::invalid_config(
                "dispatch_interval",
                "Dispatch interval must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.channel_capacity, 1000);
        assert_eq!(config.result_capacity, 1000);
        assert_eq!(config.dispatch_interval, Duration::from_millis(10));
        assert_eq!(config.shutdown_policy, ShutdownPolicy::Drain);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_means_cpus() {
        assert_eq!(PoolConfig::new(0).num_workers, num_cpus::get());
        assert_eq!(PoolConfig::new(3).num_workers, 3);
    }

    #[test]
    fn test_validate_rejects_zero_capacities() {
        let config = PoolConfig::new(2).with_channel_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig { ref parameter, .. }) if parameter == "channel_capacity"
        ));

        let config = PoolConfig::new(2).with_result_capacity(0);
        assert!(config.validate().is_err());

        let mut config = PoolConfig::new(2);
        config.num_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[should_panic(expected = "dispatch interval must be non-zero")]
    fn test_dispatch_interval_zero_panics() {
        let _ = PoolConfig::new(2).with_dispatch_interval(Duration::ZERO);
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            PoolState::Created,
            PoolState::Running,
            PoolState::Stopping,
            PoolState::Stopped,
        ] {
            assert_eq!(PoolState::from_u8(state as u8), state);
        }
        assert_eq!(PoolState::Stopping.to_string(), "stopping");
    }
}
