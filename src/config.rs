use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PoolError, Result};

/// Default number of worker threads.
pub const DEFAULT_THREADS: usize = 4;

/// Default number of job slots in the queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Sizing of a [`WorkerPool`](crate::WorkerPool).
///
/// Both values are fixed for the lifetime of the pool. Missing fields in
/// a JSON config fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Number of job slots in the shared queue.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            threads: DEFAULT_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// Creates a config with the given sizes.
    pub fn new(threads: usize, queue_capacity: usize) -> Self {
        PoolConfig {
            threads,
            queue_capacity,
        }
    }

    /// Reads a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PoolConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Checks that both sizes are non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(PoolError::InvalidThreadCount(self.threads));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidCapacity(self.queue_capacity));
        }
        Ok(())
    }
}
