use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use tracing::debug;

use crate::errors::Result;

/// Fixed-size set of workers used for every fork-join phase of a run.
///
/// Work is split statically: worker `k` of `W` owns the residue class
/// `k, k + W, k + 2W, ...` of whatever index space the phase walks. Each call
/// to [`WorkerPool::fork_join`] returns only after all workers have finished,
/// so writes made inside one phase are visible to the next.
#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl WorkerPool {
    /// Builds a rayon pool with exactly `workers` threads
    pub fn new(workers: NonZeroUsize) -> Result<Self> {
        let workers = workers.get();
        if workers == 1 {
            return Ok(Self::inline());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("semifactor-worker-{}", i))
            .build()?;
        debug!("Built worker pool with {} threads", workers);

        Ok(Self {
            pool: Some(pool),
            workers,
        })
    }

    /// A single worker running on the calling thread
    pub fn inline() -> Self {
        Self {
            pool: None,
            workers: 1,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Runs `job(k)` for every worker index `k` and waits for all of them
    pub fn fork_join<F>(&self, job: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| (0..self.workers).into_par_iter().for_each(&job)),
            None => job(0),
        }
    }
}

/// Indices of `0..len` owned by worker `k` of `workers`
pub fn residue_class(k: usize, workers: usize, len: usize) -> impl Iterator<Item = usize> {
    (k..len).step_by(workers)
}
