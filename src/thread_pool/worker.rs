use std::io;
use std::sync::Arc;
use std::thread;

use log::{debug, error, trace};

use super::{Shared, WorkerState};

/// Spawns worker `id` and registers its handle with the pool.
pub(super) fn spawn_worker(id: usize, shared: Arc<Shared>) -> io::Result<()> {
    shared.set_state(id, WorkerState::Idle);
    let worker = Worker {
        id,
        shared: Arc::clone(&shared),
    };
    let handle = thread::Builder::new()
        .name(format!("jobpool-worker-{id}"))
        .spawn(move || run_jobs(worker))?;
    shared.register(id, handle);
    Ok(())
}

/// Owned by the worker thread. If a job panics, dropping this during the
/// unwind starts a replacement in the same slot, so the pool keeps its
/// thread count.
struct Worker {
    id: usize,
    shared: Arc<Shared>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        error!("Worker {} panicked while running a job", self.id);
        if let Err(e) = spawn_worker(self.id, Arc::clone(&self.shared)) {
            error!("Failed to respawn worker {}: {}", self.id, e);
            self.shared.set_state(self.id, WorkerState::Stopped);
        }
    }
}

/// Pops and runs jobs until the queue is closed and drained.
fn run_jobs(worker: Worker) {
    let id = worker.id;
    debug!("Worker {id} started");

    while let Some(job) = worker.shared.queue.pop() {
        if job.is_empty() {
            trace!("Worker {id} skipping empty job");
            continue;
        }
        worker.shared.set_state(id, WorkerState::Running);
        job.run();
        worker.shared.set_state(id, WorkerState::Idle);
    }

    worker.shared.set_state(id, WorkerState::Stopped);
    debug!("Worker {id}: queue closed, shutting down");
}
