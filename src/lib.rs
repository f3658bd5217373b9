#![deny(missing_docs)]

//! A bounded job queue and a fixed-size worker thread pool.
//!
//! Producers submit [`Job`]s into a [`WorkerPool`]; a fixed set of worker
//! threads pops them from one shared [`BoundedQueue`] and runs them in
//! submission order. A full queue rejects new work immediately instead of
//! blocking the producer.

mod config;
mod error;
mod job;
mod queue;
/// Worker threads consuming from a shared job queue.
pub mod thread_pool;

pub use config::{PoolConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREADS};
pub use error::{PoolError, PushError, Result};
pub use job::Job;
pub use queue::{BoundedQueue, JobQueue};
pub use thread_pool::{WorkerPool, WorkerState};
