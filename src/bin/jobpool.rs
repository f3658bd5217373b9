use std::path::PathBuf;
use std::process::exit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam::sync::WaitGroup;
use log::{error, info};
use serde::Serialize;

use jobpool::{Job, PoolConfig, PushError, Result, WorkerPool, DEFAULT_QUEUE_CAPACITY};

const DEFAULT_JOBS: usize = 1000;

#[derive(Parser)]
#[command(
    name = "jobpool",
    version,
    about = "Drive a bounded worker pool with synthetic jobs"
)]
struct Cli {
    /// Number of worker threads [default: number of CPUs]
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Number of job slots in the queue [default: 256]
    #[arg(long, value_name = "N")]
    capacity: Option<usize>,

    /// Number of jobs to submit
    #[arg(long, default_value_t = DEFAULT_JOBS, value_name = "N")]
    jobs: usize,

    /// Time each job sleeps, in microseconds
    #[arg(long, default_value_t = 0, value_name = "MICROS")]
    work_us: u64,

    /// JSON file with "threads" and "queue_capacity"
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of one run.
#[derive(Debug, Serialize)]
struct RunReport {
    threads: usize,
    queue_capacity: usize,
    submitted: usize,
    /// Jobs turned away by a full queue at least once.
    rejected: usize,
    /// Submission attempts that hit a full queue.
    retries: usize,
    executed: usize,
    elapsed_ms: f64,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    info!("jobpool {}", env!("CARGO_PKG_VERSION"));
    info!(
        "{} workers, {} queue slots, {} jobs",
        config.threads, config.queue_capacity, cli.jobs
    );

    let pool = WorkerPool::with_config(&config)?;
    let report = drive(&pool, cli.jobs, Duration::from_micros(cli.work_us))?;
    pool.shutdown();

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("threads:    {}", report.threads);
        println!("capacity:   {}", report.queue_capacity);
        println!("submitted:  {}", report.submitted);
        println!("rejected:   {}", report.rejected);
        println!("retries:    {}", report.retries);
        println!("executed:   {}", report.executed);
        println!("elapsed_ms: {:.3}", report.elapsed_ms);
    }

    Ok(())
}

/// Layers command-line flags over the config file, or over the defaults
/// when no file is given.
fn resolve_config(cli: &Cli) -> Result<PoolConfig> {
    let mut config = match &cli.config {
        Some(path) => PoolConfig::from_json_file(path)?,
        None => PoolConfig::new(num_cpus::get(), DEFAULT_QUEUE_CAPACITY),
    };
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if let Some(capacity) = cli.capacity {
        config.queue_capacity = capacity;
    }
    config.validate()?;
    Ok(config)
}

/// Submits `jobs` jobs, retrying each rejected one until it is accepted,
/// and waits for all of them to run.
fn drive(pool: &WorkerPool, jobs: usize, work: Duration) -> Result<RunReport> {
    let executed = Arc::new(AtomicUsize::new(0));
    let wg = WaitGroup::new();
    let mut rejected = 0;
    let mut retries = 0;
    let start = Instant::now();

    for _ in 0..jobs {
        let executed = Arc::clone(&executed);
        let wg = wg.clone();
        let mut job = Job::new(move || {
            if !work.is_zero() {
                thread::sleep(work);
            }
            executed.fetch_add(1, Ordering::SeqCst);
            drop(wg);
        });

        let mut attempts = 0;
        loop {
            match pool.submit(job) {
                Ok(()) => break,
                Err(PushError::Full(returned)) => {
                    if attempts == 0 {
                        rejected += 1;
                    }
                    attempts += 1;
                    retries += 1;
                    job = returned;
                    thread::yield_now();
                }
                Err(e @ PushError::Closed(_)) => return Err(e.into()),
            }
        }
    }

    wg.wait();

    Ok(RunReport {
        threads: pool.threads(),
        queue_capacity: pool.capacity(),
        submitted: jobs,
        rejected,
        retries,
        executed: executed.load(Ordering::SeqCst),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_counts_each_job_once() -> Result<()> {
        const JOBS: usize = 10;

        let pool = WorkerPool::new(1, 1)?;
        let report = drive(&pool, JOBS, Duration::from_millis(2))?;

        assert_eq!(report.executed, JOBS);
        assert!(report.rejected > 0);
        assert!(report.rejected <= JOBS);
        assert!(report.retries >= report.rejected);
        Ok(())
    }
}
