//! Persistent bounded worker pool for per-frame fan-out.
//!
//! The pool is sized once at service construction and reused for every
//! frame, so per-frame cost is only the channel traffic. Workers never
//! unwind past their loop: task panics are caught and reported as an
//! error to the submitting call.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use thiserror::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("worker pool requires at least one worker")]
    NoWorkers,
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),
    #[error("a worker task panicked")]
    TaskPanicked,
    #[error("worker pool shut down while tasks were pending")]
    Disconnected,
}

pub struct WorkerPool {
    job_tx: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::NoWorkers);
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let rx = job_rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("card-worker-{i}"))
                .spawn(move || {
                    for job in rx {
                        job();
                    }
                })
                .map_err(PoolError::Spawn)?;
            handles.push(handle);
        }

        Ok(Self {
            job_tx: Some(job_tx),
            handles,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Splits `items` into balanced chunks, runs `f` over each chunk on
    /// the pool, and returns the chunk results in chunk order.
    ///
    /// Blocks until every chunk completes. A panic in any chunk fails the
    /// whole call instead of crashing the process.
    pub fn map_chunks<T, R, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>, PoolError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&[T]) -> R + Send + Sync + 'static,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let f = Arc::new(f);
        let chunks = split_balanced(items, self.workers);
        let pending = chunks.len();
        let (result_tx, result_rx) = crossbeam_channel::bounded::<(usize, Option<R>)>(pending);

        for (index, chunk) in chunks.into_iter().enumerate() {
            let f = f.clone();
            let result_tx = result_tx.clone();
            self.submit(Box::new(move || {
                let result = catch_unwind(AssertUnwindSafe(|| f(&chunk)));
                // Receiver may be gone if an earlier chunk already failed
                let _ = result_tx.send((index, result.ok()));
            }));
        }
        drop(result_tx);

        let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(pending).collect();
        for _ in 0..pending {
            let (index, result) = result_rx.recv().map_err(|_| PoolError::Disconnected)?;
            match result {
                Some(value) => slots[index] = Some(value),
                None => return Err(PoolError::TaskPanicked),
            }
        }

        Ok(slots
            .into_iter()
            .map(|slot| slot.expect("every chunk reported a result"))
            .collect())
    }

    fn submit(&self, job: Job) {
        let tx = self
            .job_tx
            .as_ref()
            .expect("job channel open until the pool is dropped");
        // Workers only exit when the channel closes, so send cannot fail
        let _ = tx.send(job);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.job_tx.take());
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

/// At most `workers` chunks; the first `len % chunks` chunks carry one
/// extra item so sizes differ by at most one.
fn split_balanced<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let len = items.len();
    let chunk_count = workers.min(len).max(1);
    let base = len / chunk_count;
    let extra = len % chunk_count;

    let mut chunks = Vec::with_capacity(chunk_count);
    let mut iter = items.into_iter();
    for i in 0..chunk_count {
        let size = base + usize::from(i < extra);
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}
