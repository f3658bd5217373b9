use std::fmt;
use std::io;

use thiserror::Error;

/// Error type for pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// IO error, e.g. the OS refused to spawn a worker thread.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error while reading a config.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The queue is at capacity and rejected the job.
    #[error("Job queue is full")]
    QueueFull,

    /// The queue has been closed and accepts no more jobs.
    #[error("Job queue is closed")]
    Closed,

    /// A queue must hold at least one job.
    #[error("Invalid queue capacity {0}: must be at least 1")]
    InvalidCapacity(usize),

    /// A pool must run at least one worker.
    #[error("Invalid thread count {0}: must be at least 1")]
    InvalidThreadCount(usize),
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// A rejected push. Carries the item back to the caller, who decides
/// whether to retry, drop it or apply backpressure upstream.
#[derive(PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue holds `capacity` items already.
    Full(T),
    /// The queue has been closed.
    Closed(T),
}

impl<T> PushError<T> {
    /// Recovers the item that could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) | PushError::Closed(item) => item,
        }
    }

    /// Returns `true` if the push failed because the queue was full.
    pub fn is_full(&self) -> bool {
        matches!(self, PushError::Full(_))
    }

    /// Returns `true` if the push failed because the queue was closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, PushError::Closed(_))
    }
}

// Manual impls so that `T` (often a closure) need not be `Debug`.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("Full(..)"),
            PushError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("pushing into a full queue"),
            PushError::Closed(_) => f.write_str("pushing into a closed queue"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

impl<T> From<PushError<T>> for PoolError {
    fn from(err: PushError<T>) -> Self {
        match err {
            PushError::Full(_) => PoolError::QueueFull,
            PushError::Closed(_) => PoolError::Closed,
        }
    }
}
