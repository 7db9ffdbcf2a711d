//! Bounded pool for CPU-heavy operation bodies.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{AcquireError, Semaphore};

/// Runs blocking jobs on tokio's blocking threads, with at most `workers`
/// jobs in flight across every pipeline sharing the pool.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

#[derive(Debug)]
pub enum PoolError {
    /// The permit semaphore was closed, so no slot can be handed out.
    Acquire(AcquireError),
    /// The job panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Acquire(e) => write!(f, "no worker slot available: {}", e),
            PoolError::Join(e) => write!(f, "worker job failed: {}", e),
        }
    }
}

impl std::error::Error for PoolError {}

impl WorkerPool {
    /// Create a pool allowing `workers` concurrent jobs (at least one).
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// A pool sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `job` once a slot is free and wait for its result.
    pub async fn run<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(PoolError::Acquire)?;
        tokio::task::spawn_blocking(job)
            .await
            .map_err(PoolError::Join)
    }
}
