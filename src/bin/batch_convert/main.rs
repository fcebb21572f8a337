mod args;
mod report;

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{self as channel, select};
use image_batch_pool::batch::{plan_jobs, run_sequential};
use image_batch_pool::generator::generate_test_images;
use image_batch_pool::prelude::*;

use crate::args::{Args, Command, Mode, RunArgs};
use crate::report::RunReport;

const STATS_INTERVAL: Duration = Duration::from_secs(2);
const WAIT_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match args.command {
        Command::Generate { count, dir } => generate_test_images(count, &dir)
            .map(|paths| println!("Generated {} images in {}", paths.len(), dir.display()))
            .context("generating test images"),
        Command::Run(run) => begin(run),
    };

    if let Err(error) = result {
        log::error!("{:#}", error);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn begin(args: RunArgs) -> Result<()> {
    let start = Instant::now();

    if let Some(count) = args.generate {
        generate_test_images(count, &args.input).context("generating test images")?;
    }

    let quality = Quality::new(args.quality)?;
    let jobs = plan_jobs(
        &args.input,
        &args.output,
        args.format,
        quality,
        &PriorityPolicy::default(),
        chrono::Utc::now(),
    )
    .with_context(|| format!("scanning {}", args.input.display()))?;
    let total_files = jobs.len();

    let report = match args.mode {
        Mode::Sync => {
            log::info!("Processing {} images synchronously...", total_files);
            let summary = run_sequential(jobs, &ImageConverter::new());
            for (index, outcome) in summary.outcomes.iter().enumerate() {
                if !args.json && (index + 1) % 10 == 0 {
                    println!("[{}/{}] {}", index + 1, total_files, outcome);
                }
            }
            RunReport::sequential(summary, start.elapsed())
        }
        Mode::Pool => run_pool(&args, jobs, start)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

fn run_pool(args: &RunArgs, jobs: Vec<Job>, start: Instant) -> Result<RunReport> {
    let total_files = jobs.len();
    let config = PoolConfig::new(args.workers).with_channel_capacity(args.channel_capacity);
    let pool = WorkerPool::with_config(config)?;

    log::info!("Starting worker pool ({} workers)...", pool.num_workers());
    pool.start(ImageConverter::new())?;

    let results = pool.results();
    let quiet = args.json;
    let monitor = thread::Builder::new()
        .name("results-monitor".to_string())
        .spawn(move || monitor_results(results, quiet))
        .context("spawning results monitor")?;

    // Dropping the sender stops the ticker thread
    let (stop_stats, stats_stopped) = channel::bounded::<()>(0);

    thread::scope(|scope| -> Result<RunReport> {
        let pool = &pool;
        scope.spawn(move || {
            let ticker = channel::tick(STATS_INTERVAL);
            loop {
                select! {
                    recv(ticker) -> _ => {
                        if !quiet {
                            print_progress(pool);
                        }
                    }
                    recv(stats_stopped) -> _ => break,
                }
            }
        });

        let stop = settle(pool, submit_and_drain(pool, jobs, quiet));
        drop(stop_stats);

        // The stream ends once the pool has stopped, on success or failure
        let seen = monitor
            .join()
            .map_err(|_| anyhow::anyhow!("results monitor panicked"))?;
        log::debug!("results monitor saw {} outcomes", seen);
        let stop = stop?;

        Ok(RunReport::pool(pool, stop, total_files, start.elapsed()))
    })
}

fn submit_and_drain(pool: &WorkerPool, jobs: Vec<Job>, quiet: bool) -> Result<StopReport> {
    let total_files = jobs.len();
    for (index, job) in jobs.into_iter().enumerate() {
        pool.submit(job)?;
        if !quiet && (index + 1) % 50 == 0 {
            println!(
                "Submitted {}/{} jobs (queue: {})",
                index + 1,
                total_files,
                pool.queue_len()
            );
        }
    }
    log::info!("All {} jobs submitted to queue", total_files);

    while pool.queue_len() > 0 {
        thread::sleep(WAIT_INTERVAL);
        if !quiet {
            println!("Waiting... queue: {}", pool.queue_len());
        }
    }

    log::info!("Stopping worker pool...");
    Ok(pool.stop_and_drain()?)
}

/// Make sure the pool is stopped after a failed run so the result stream closes
fn settle(pool: &WorkerPool, outcome: Result<StopReport>) -> Result<StopReport> {
    if outcome.is_err() && pool.is_running() {
        if let Err(e) = pool.stop_immediate() {
            log::error!("stopping pool after failure: {}", e);
        }
    }
    outcome
}

fn monitor_results(results: ResultStream, quiet: bool) -> u64 {
    let mut processed = 0;
    for outcome in results {
        processed += 1;
        if !quiet && processed % 10 == 0 {
            println!("[Results] {}: {}", processed, outcome);
        }
    }
    processed
}

fn print_progress(pool: &WorkerPool) {
    let stats = pool.stats();
    println!(
        "[Stats] Busy: {}/{} | Total jobs: {} | Queue: {}",
        stats.busy_workers,
        pool.num_workers(),
        stats.jobs_done,
        stats.pending
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &Job) -> std::result::Result<Duration, JobError> {
        Ok(Duration::ZERO)
    }

    #[test]
    fn test_failed_run_stops_pool_and_ends_monitor() {
        let pool = WorkerPool::new(2, 4).unwrap();
        pool.start(noop).unwrap();
        pool.submit(Job::new(JobId(1), Priority::High, "a.jpg", "a.png"))
            .unwrap();
        let results = pool.results();
        let monitor = thread::spawn(move || monitor_results(results, true));

        let outcome = settle(&pool, Err(anyhow::anyhow!("submission failed")));

        assert!(outcome.is_err());
        assert_eq!(pool.state(), PoolState::Stopped);
        assert!(monitor.join().unwrap() <= 1);
    }

    #[test]
    fn test_successful_run_is_left_alone() {
        let pool = WorkerPool::new(1, 1).unwrap();
        pool.start(noop).unwrap();
        let stop = pool.stop_and_drain().unwrap();

        let outcome = settle(&pool, Ok(stop.clone()));
        assert_eq!(outcome.unwrap(), stop);
    }
}
