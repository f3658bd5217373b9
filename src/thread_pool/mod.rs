use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::config::PoolConfig;
use crate::error::PushError;
use crate::job::Job;
use crate::queue::JobQueue;
use crate::{PoolError, Result};

mod worker;

/// What a worker thread is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Blocked waiting for a job.
    Idle,
    /// Executing a job.
    Running,
    /// Exited after the queue was closed and drained.
    Stopped,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Idle,
            1 => WorkerState::Running,
            _ => WorkerState::Stopped,
        }
    }
}

/// State shared between the pool handle and its workers.
struct Shared {
    queue: JobQueue,
    states: Box<[AtomicU8]>,
    /// One slot per worker id, holding its current thread.
    handles: Mutex<Vec<Option<JoinHandle<()>>>>,
}

impl Shared {
    fn set_state(&self, id: usize, state: WorkerState) {
        self.states[id].store(state as u8, Ordering::Release);
    }

    fn state(&self, id: usize) -> WorkerState {
        WorkerState::from_u8(self.states[id].load(Ordering::Acquire))
    }

    /// Puts `handle` in slot `id`. A respawn replaces the handle of the
    /// panicking thread that is calling this, which detaches it.
    fn register(&self, id: usize, handle: JoinHandle<()>) {
        self.handles()[id] = Some(handle);
    }

    fn handles(&self) -> MutexGuard<'_, Vec<Option<JoinHandle<()>>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed-size pool of worker threads fed from one bounded queue.
///
/// Submission never blocks: when the queue is full the job is handed back
/// and the caller decides what to do with it. Jobs run synchronously on
/// whichever worker pops them, in submission order.
///
/// The pool does not catch panics raised by a job. The panic unwinds that
/// worker's thread as usual, and a replacement worker is started so the
/// pool stays at its configured size.
///
/// Dropping the pool (or calling [`shutdown`](WorkerPool::shutdown))
/// closes the queue, lets the workers finish every job already queued,
/// and joins them.
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Creates a pool of `threads` workers sharing a queue of
    /// `queue_capacity` slots.
    ///
    /// The queue is fully built before the first worker starts.
    ///
    /// # Errors
    ///
    /// Returns an error if either size is zero, or if a worker thread
    /// cannot be spawned. Workers started before the failure are stopped.
    pub fn new(queue_capacity: usize, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(PoolError::InvalidThreadCount(threads));
        }
        let queue = JobQueue::new(queue_capacity)?;
        let shared = Arc::new(Shared {
            queue,
            states: (0..threads).map(|_| AtomicU8::new(0)).collect(),
            handles: Mutex::new((0..threads).map(|_| None).collect()),
        });
        let pool = WorkerPool { shared };

        for id in 0..threads {
            // On failure, dropping `pool` closes the queue and joins the
            // workers spawned so far.
            worker::spawn_worker(id, Arc::clone(&pool.shared))?;
        }
        debug!("Started {threads} workers with a queue of {queue_capacity} slots");

        Ok(pool)
    }

    /// Creates a pool sized by `config`.
    pub fn with_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.queue_capacity, config.threads)
    }

    /// Queues `job` for execution without blocking.
    ///
    /// # Errors
    ///
    /// Hands the job back in [`PushError::Full`] if the queue is at
    /// capacity, or in [`PushError::Closed`] once the pool is shutting down.
    pub fn submit(&self, job: Job) -> std::result::Result<(), PushError<Job>> {
        self.shared.queue.push(job)
    }

    /// Queues a closure for execution without blocking.
    ///
    /// Unlike [`submit`](Self::submit), a rejected closure is dropped.
    pub fn spawn<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Job::new(f)).map_err(PoolError::from)
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.shared.states.len()
    }

    /// Number of job slots in the queue.
    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Number of jobs waiting to be picked up.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Snapshot of every worker's state, indexed by worker id.
    pub fn worker_states(&self) -> Vec<WorkerState> {
        (0..self.threads()).map(|id| self.shared.state(id)).collect()
    }

    /// Stops accepting jobs, waits for queued jobs to run, and joins all
    /// workers.
    pub fn shutdown(self) {
        drop(self);
    }

    fn stop_and_join(&self) {
        self.shared.queue.close();

        // A worker that panics registers its replacement before it exits,
        // so keep draining until every slot is empty.
        loop {
            let handles: Vec<_> = self
                .shared
                .handles()
                .iter_mut()
                .filter_map(Option::take)
                .collect();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if handle.thread().id() == thread::current().id() {
                    continue;
                }
                let name = handle.thread().name().unwrap_or("worker").to_owned();
                if handle.join().is_err() {
                    warn!("{name} exited with a panic");
                }
            }
        }
        debug!("All workers stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
