//! Execution contexts used by the router
//!
//! Two contexts take part in a launch: the worker, which runs storage I/O
//! (the decision task, restores, reconciliations), and the interactive
//! ("main") context, which runs lifecycle callbacks and screen
//! transitions and must never block on storage.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::warn;

/// A unit of work handed to an execution context
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Background execution context
pub trait Worker: Send + Sync {
    /// Run `job` off the calling thread. Fire-and-forget.
    fn execute(&self, job: Job);
}

/// Interactive execution context
pub trait MainThread: Send + Sync {
    /// Queue `job` to run on the interactive context
    fn post(&self, job: Job);
}

/// Worker backed by a rayon thread pool
pub struct RayonWorker {
    pool: Option<rayon::ThreadPool>,
}

impl RayonWorker {
    /// Use rayon's global pool
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Use a dedicated pool of `threads` named worker threads
    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("launch-worker-{}", i))
            .build()
            .context("Failed to build worker thread pool")?;
        Ok(Self { pool: Some(pool) })
    }
}

impl Worker for RayonWorker {
    fn execute(&self, job: Job) {
        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
    }
}

/// Runs jobs immediately on the calling thread (tests, FFI hosts that
/// already call in from a background thread)
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineWorker;

impl Worker for InlineWorker {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Runs posted jobs immediately on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineMainThread;

impl MainThread for InlineMainThread {
    fn post(&self, job: Job) {
        job();
    }
}

/// Channel-backed interactive context
///
/// [`MainLoopHandle`]s post jobs from any thread; the thread owning the
/// [`MainLoop`] runs them in order.
pub struct MainLoop {
    receiver: Receiver<Job>,
    sender: Sender<Job>,
}

/// Posting side of a [`MainLoop`]
pub struct MainLoopHandle {
    sender: Mutex<Sender<Job>>,
}

impl MainLoop {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { receiver, sender }
    }

    /// A handle that posts onto this loop
    pub fn handle(&self) -> MainLoopHandle {
        MainLoopHandle {
            sender: Mutex::new(self.sender.clone()),
        }
    }

    /// Run queued jobs without waiting; returns how many ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run jobs as they arrive until `done` holds or `timeout` passes
    ///
    /// Returns whether `done` held before the deadline.
    pub fn run_until(&self, timeout: Duration, done: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(job) => job(),
                Err(RecvTimeoutError::Timeout) => return done(),
                // Unreachable while `self.sender` is alive
                Err(RecvTimeoutError::Disconnected) => return done(),
            }
        }
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl MainThread for MainLoopHandle {
    fn post(&self, job: Job) {
        let sender = self.sender.lock().unwrap();
        if sender.send(job).is_err() {
            warn!("Main loop is gone, dropping posted job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_inline_contexts_run_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));

        let c = counter.clone();
        InlineWorker.execute(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        let c = counter.clone();
        InlineMainThread.post(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_main_loop_runs_posted_jobs_in_order() {
        let main_loop = MainLoop::new();
        let handle = main_loop.handle();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            handle.post(Box::new(move || order.lock().unwrap().push(i)));
        }
        assert!(order.lock().unwrap().is_empty());

        assert_eq!(main_loop.run_pending(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_worker_to_main_loop_roundtrip() {
        let main_loop = MainLoop::new();
        let handle = Arc::new(main_loop.handle());
        let worker = RayonWorker::with_threads(2).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        let d = done.clone();
        worker.execute(Box::new(move || {
            handle.post(Box::new(move || {
                d.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert!(main_loop.run_until(Duration::from_secs(5), || done.load(Ordering::SeqCst) == 1));
    }

    #[test]
    fn test_run_until_times_out() {
        let main_loop = MainLoop::new();
        assert!(!main_loop.run_until(Duration::from_millis(20), || false));
    }
}
