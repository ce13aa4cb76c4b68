//! opskit-pool: bounded-concurrency worker pool with error collection.
//!
//! A [`WorkerPool`] admits submitted jobs up to a fixed number of
//! concurrently active slots. Jobs signal completion through a one-shot
//! [`Completion`] handle, either synchronously by returning an error or
//! later from another task; per-job errors are collected and surfaced
//! through [`WorkerPool::errors`].
//!
//! ```rust,no_run
//! use opskit_pool::WorkerPool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = WorkerPool::new(3);
//!
//!     for i in 0..10 {
//!         pool.submit(move |done| {
//!             tokio::spawn(async move {
//!                 println!("working on {i}");
//!                 done.done(None);
//!             });
//!             Ok(())
//!         })
//!         .await;
//!     }
//!
//!     for err in pool.errors().await {
//!         eprintln!("job failed: {err}");
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{watch, Semaphore};

struct PoolState {
    errors: Vec<anyhow::Error>,
    closed: bool,
}

struct Inner {
    /// Slot queue; a permit is held from admission until completion
    slots: Semaphore,
    /// Jobs admitted (or queued in submit) and not yet completed
    in_flight: watch::Sender<usize>,
    state: RwLock<PoolState>,
    /// One-shot guard for close()
    closer: AtomicBool,
}

/// Completion handle passed to every job.
///
/// Must be invoked exactly once per job; extra invocations are ignored.
/// The handle is `Clone + Send` so a job can move it into whatever task
/// eventually finishes the work.
#[derive(Clone)]
pub struct Completion {
    inner: Arc<Inner>,
    fired: Arc<AtomicBool>,
}

impl Completion {
    /// Report the job as finished, with an optional error to record.
    pub fn done(&self, err: Option<anyhow::Error>) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        // Decrement first so wait() can drain even after the pool closed
        self.inner.in_flight.send_modify(|active| *active -= 1);

        if self.inner.state.read().closed {
            return;
        }

        self.inner.slots.add_permits(1);

        if let Some(err) = err {
            self.inner.state.write().errors.push(err);
        }
    }
}

/// Bounded-concurrency dispatcher.
///
/// Cloning creates a new handle to the SAME pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Create a pool that runs at most `capacity` jobs concurrently
    pub fn new(capacity: usize) -> Self {
        let (in_flight, _) = watch::channel(0);

        Self {
            inner: Arc::new(Inner {
                slots: Semaphore::new(capacity),
                in_flight,
                state: RwLock::new(PoolState {
                    errors: Vec::new(),
                    closed: false,
                }),
                closer: AtomicBool::new(false),
            }),
        }
    }

    /// Admit a job, blocking until a slot is free.
    ///
    /// The job receives a [`Completion`] it must eventually invoke; as a
    /// shortcut it may instead return an error, which the pool treats as an
    /// immediate `done(Some(err))`. A job that neither returns an error nor
    /// invokes its completion stalls the pool forever.
    pub async fn submit<F>(&self, job: F)
    where
        F: FnOnce(Completion) -> Result<(), anyhow::Error>,
    {
        self.inner.in_flight.send_modify(|active| *active += 1);

        match self.inner.slots.acquire().await {
            // The permit is returned through Completion::done
            Ok(permit) => permit.forget(),
            Err(_) => {
                tracing::warn!("job submitted to a closed pool, dropping it");
                self.inner.in_flight.send_modify(|active| *active -= 1);
                return;
            }
        }

        let completion = Completion {
            inner: self.inner.clone(),
            fired: Arc::new(AtomicBool::new(false)),
        };

        if let Err(err) = job(completion.clone()) {
            completion.done(Some(err));
        }
    }

    /// Block until every admitted job has completed, then close the pool
    pub async fn wait(&self) {
        let mut in_flight = self.inner.in_flight.subscribe();
        let _ = in_flight.wait_for(|active| *active == 0).await;
        self.close();
    }

    /// Wait for all jobs, then drain and return the collected errors.
    ///
    /// Errors are returned in completion order, which need not match
    /// submission order. A second call returns an empty list.
    pub async fn errors(&self) -> Vec<anyhow::Error> {
        self.wait().await;
        std::mem::take(&mut self.inner.state.write().errors)
    }

    /// Terminate the pool. Idempotent; completions arriving afterwards
    /// still unblock [`wait`](Self::wait) but release no slots and record
    /// no errors.
    pub fn close(&self) {
        if self.inner.closer.swap(true, Ordering::SeqCst) {
            return;
        }

        self.inner.state.write().closed = true;
        self.inner.slots.close();
    }
}

#[cfg(test)]
mod tests;
