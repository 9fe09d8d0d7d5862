//! Fixed-size pool running one body on every thread, its phases separated by a shared barrier

use {
    crate::error::{Error, Result},
    rayon::{ThreadPool, ThreadPoolBuilder},
    std::{
        ops::Range,
        sync::{Barrier, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    },
};

pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Parameters("at least one worker is required".into()));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("gke-worker-{}", i))
            .build()
            .map_err(|e| Error::Parameters(format!("failed to start {} workers: {}", workers, e)))?;

        Ok(WorkerPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `body` once on every worker and returns when all of them have finished
    pub fn run<F: Fn(&Worker) + Sync>(&self, body: F) {
        let barrier = Barrier::new(self.workers);
        let workers = self.workers;

        self.pool.broadcast(|ctx| {
            body(&Worker {
                rank: ctx.index(),
                workers,
                barrier: &barrier,
            })
        });
    }
}

pub struct Worker<'a> {
    rank: usize,
    workers: usize,
    barrier: &'a Barrier,
}

impl Worker<'_> {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_leader(&self) -> bool {
        self.rank == 0
    }

    /// Blocks until every worker of the pool has arrived
    pub fn sync(&self) {
        self.barrier.wait();
    }

    /// This worker's share of `0..n`
    pub fn partition(&self, n: usize) -> Range<usize> {
        partition(n, self.rank, self.workers)
    }
}

pub fn partition(n: usize, rank: usize, workers: usize) -> Range<usize> {
    rank * n / workers..(rank + 1) * n / workers
}

/// Shared access to a workspace buffer
pub fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub fn exclusive<T>(lock: &mut RwLock<T>) -> &mut T {
    lock.get_mut().unwrap_or_else(PoisonError::into_inner)
}
