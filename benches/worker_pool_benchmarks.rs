use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use image_batch_pool::core::PriorityQueue;
use image_batch_pool::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn job(id: u64) -> Job {
    let priority = Priority::ALL[(id % 3) as usize];
    Job::new(JobId(id), priority, "in.jpg", "out.png")
}

fn noop(_: &Job) -> std::result::Result<Duration, JobError> {
    Ok(Duration::ZERO)
}

fn benchmark_pool_lifecycle(c: &mut Criterion) {
    c.bench_function("pool_start_stop", |b| {
        b.iter(|| {
            let pool = WorkerPool::new(4, 64).expect("Failed to create pool");
            pool.start(noop).expect("Failed to start pool");
            pool.stop().expect("Failed to stop pool");
        });
    });
}

fn benchmark_priority_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_queue");

    for size in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("push_pop", size), &size, |b, &size| {
            b.iter_batched(
                || (0..size).map(job).collect::<Vec<_>>(),
                |jobs| {
                    let mut queue = PriorityQueue::with_capacity(jobs.len());
                    for job in jobs {
                        queue.push(job);
                    }
                    while let Some(job) = queue.pop() {
                        black_box(job);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(10));

    for channel_capacity in [1usize, 16, 1000] {
        group.bench_with_input(
            BenchmarkId::new("jobs_1000", channel_capacity),
            &channel_capacity,
            |b, &channel_capacity| {
                b.iter_batched(
                    || {
                        let counter = Arc::new(AtomicU64::new(0));
                        let counter_clone = Arc::clone(&counter);
                        let pool = WorkerPool::new(8, channel_capacity)
                            .expect("Failed to create pool");
                        pool.start(move |_: &Job| {
                            counter_clone.fetch_add(1, Ordering::Relaxed);
                            Ok::<_, JobError>(Duration::ZERO)
                        })
                        .expect("Failed to start pool");
                        (pool, counter)
                    },
                    |(pool, counter)| {
                        for id in 0..1000 {
                            pool.submit(job(id)).expect("Failed to submit job");
                        }
                        pool.stop_and_drain().expect("Failed to stop pool");
                        assert_eq!(counter.load(Ordering::Relaxed), 1000);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn benchmark_backpressure(c: &mut Criterion) {
    c.bench_function("slow_workers_small_channel", |b| {
        b.iter_batched(
            || {
                let pool = WorkerPool::new(4, 4).expect("Failed to create pool");
                pool.start(|_: &Job| {
                    std::thread::sleep(Duration::from_micros(100));
                    Ok::<_, JobError>(Duration::from_micros(100))
                })
                .expect("Failed to start pool");
                pool
            },
            |pool| {
                for id in 0..150 {
                    pool.submit(job(id)).expect("Failed to submit job");
                }
                pool.stop().expect("Failed to stop pool");
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    benchmark_pool_lifecycle,
    benchmark_priority_queue,
    benchmark_throughput,
    benchmark_backpressure
);
criterion_main!(benches);
