//! Tokio-backed execution contexts for the router
//!
//! Storage work goes to tokio's blocking pool; screen transitions are
//! queued for the main task, which drains them in [`MainQueue::run_until_finished`].

use std::time::Duration;

use anyhow::{Result, bail};
use log::{debug, warn};
use mail::launch::{Job, MainThread, Worker};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Runs jobs on tokio's blocking thread pool
pub struct TokioWorker {
    handle: Handle,
}

impl TokioWorker {
    /// Worker on the runtime driving the current task
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }
}

impl Worker for TokioWorker {
    fn execute(&self, job: Job) {
        // Fire-and-forget: the job reports its own outcome
        drop(self.handle.spawn_blocking(job));
    }
}

/// Posting side of the main task's queue
#[derive(Clone)]
pub struct MainQueueHandle {
    sender: UnboundedSender<Job>,
}

impl MainThread for MainQueueHandle {
    fn post(&self, job: Job) {
        if self.sender.send(job).is_err() {
            warn!("Main queue closed, dropping posted job");
        }
    }
}

/// Jobs waiting for the main task
pub struct MainQueue {
    receiver: UnboundedReceiver<Job>,
    sender: UnboundedSender<Job>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { receiver, sender }
    }

    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run posted jobs until `finished` holds
    ///
    /// Fails when nothing finishes the activation within `timeout`.
    pub async fn run_until_finished(
        &mut self,
        timeout: Duration,
        finished: impl Fn() -> bool,
    ) -> Result<usize> {
        let mut ran = 0;
        let deadline = tokio::time::Instant::now() + timeout;

        while !finished() {
            match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                Ok(Some(job)) => {
                    job();
                    ran += 1;
                }
                // Unreachable while `self.sender` is alive
                Ok(None) => break,
                Err(_) => bail!("Launch did not finish within {:?}", timeout),
            }
        }

        debug!("Main queue ran {} job(s)", ran);
        Ok(ran)
    }
}
