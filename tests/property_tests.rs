//! Property-based tests for image_batch_pool using proptest

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use image_batch_pool::core::PriorityQueue;
use image_batch_pool::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Mid), Just(Priority::Low)]
}

fn job(id: u64, priority: Priority) -> Job {
    Job::new(JobId(id), priority, "in.jpg", "out.png")
}

// ============================================================================
// PriorityQueue
// ============================================================================

proptest! {
    /// Pops come out sorted by priority, FIFO within a priority
    #[test]
    fn test_queue_pops_in_priority_then_fifo_order(
        priorities in prop::collection::vec(priority_strategy(), 0..200)
    ) {
        let mut queue = PriorityQueue::new();
        for (id, priority) in priorities.iter().enumerate() {
            queue.push(job(id as u64, *priority));
        }
        prop_assert_eq!(queue.len(), priorities.len());

        let mut popped = Vec::new();
        while let Some(job) = queue.pop() {
            popped.push((job.priority, job.id.0));
        }

        let mut expected: Vec<(Priority, u64)> = priorities
            .iter()
            .enumerate()
            .map(|(id, p)| (*p, id as u64))
            .collect();
        expected.sort();
        prop_assert_eq!(popped, expected);
        prop_assert!(queue.is_empty());
    }

    /// Interleaved push/pop never loses or duplicates a job
    #[test]
    fn test_queue_interleaved_ops_conserve_jobs(
        ops in prop::collection::vec((any::<bool>(), priority_strategy()), 1..300)
    ) {
        let mut queue = PriorityQueue::new();
        let mut next_id = 0u64;
        let mut popped = HashSet::new();

        for (push, priority) in ops {
            if push {
                queue.push(job(next_id, priority));
                next_id += 1;
            } else if let Some(job) = queue.pop() {
                prop_assert!(popped.insert(job.id));
            }
        }
        for job in queue.drain() {
            prop_assert!(popped.insert(job.id));
        }
        prop_assert_eq!(popped.len() as u64, next_id);
    }
}

// ============================================================================
// PriorityPolicy
// ============================================================================

proptest! {
    /// Older files never get a less urgent priority than newer ones
    #[test]
    fn test_policy_is_monotonic_in_age(a in 0i64..1000, b in 0i64..1000) {
        let policy = PriorityPolicy::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let (older, newer) = if a >= b { (a, b) } else { (b, a) };

        let p_older = policy.priority_for(now - ChronoDuration::days(older), now);
        let p_newer = policy.priority_for(now - ChronoDuration::days(newer), now);
        prop_assert!(p_older <= p_newer);
    }

    /// Thresholds are exclusive
    #[test]
    fn test_policy_buckets(days in 0i64..1000) {
        let policy = PriorityPolicy::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let priority = policy.priority_for(now - ChronoDuration::days(days), now);

        let expected = if days > 365 {
            Priority::High
        } else if days > 30 {
            Priority::Mid
        } else {
            Priority::Low
        };
        prop_assert_eq!(priority, expected);
    }
}

// ============================================================================
// Quality and PoolConfig
// ============================================================================

proptest! {
    #[test]
    fn test_quality_accepts_exactly_1_to_100(value in any::<u8>()) {
        prop_assert_eq!(Quality::new(value).is_ok(), (1..=100).contains(&value));
    }

    #[test]
    fn test_config_validation(
        workers in 1usize..32,
        channel in 0usize..64,
        results in 0usize..64,
    ) {
        let config = PoolConfig::new(workers)
            .with_channel_capacity(channel)
            .with_result_capacity(results);
        prop_assert_eq!(config.validate().is_ok(), channel > 0 && results > 0);
    }
}

// ============================================================================
// WorkerPool
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every submitted job is executed exactly once
    #[test]
    fn test_pool_executes_each_job_once(
        workers in 1usize..6,
        channel in 1usize..8,
        priorities in prop::collection::vec(priority_strategy(), 0..60)
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);

        let pool = WorkerPool::new(workers, channel).unwrap();
        pool.start(move |job: &Job| {
            seen_clone.lock().push(job.id.0);
            Ok::<_, JobError>(Duration::ZERO)
        })
        .unwrap();

        for (id, priority) in priorities.iter().enumerate() {
            pool.submit(job(id as u64, *priority)).unwrap();
        }
        let report = pool.stop_and_drain().unwrap();

        let mut seen = seen.lock().clone();
        seen.sort_unstable();
        let expected: Vec<u64> = (0..priorities.len() as u64).collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(report.jobs_done, priorities.len() as u64);
        prop_assert_eq!(
            pool.worker_stats().iter().map(|s| s.jobs_done).sum::<u64>(),
            priorities.len() as u64
        );
    }

    /// With one worker and a batch held before start, execution order is
    /// non-decreasing in priority value
    #[test]
    fn test_single_worker_priority_order(
        priorities in prop::collection::vec(priority_strategy(), 1..40)
    ) {
        let order = Arc::new(Mutex::new(Vec::new()));
        let order_clone = Arc::clone(&order);

        let pool = WorkerPool::new(1, priorities.len()).unwrap();
        for (id, priority) in priorities.iter().enumerate() {
            pool.submit(job(id as u64, *priority)).unwrap();
        }
        pool.start(move |job: &Job| {
            order_clone.lock().push(job.priority);
            Ok::<_, JobError>(Duration::ZERO)
        })
        .unwrap();
        pool.stop_and_drain().unwrap();

        let order = order.lock();
        prop_assert_eq!(order.len(), priorities.len());
        prop_assert!(order.windows(2).all(|w| w[0] <= w[1]));
    }
}
