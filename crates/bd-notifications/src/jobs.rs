//! Background job processing
//!
//! A bounded pool for work that runs off the request path: order-creation
//! workflows and notification dispatch. Spawning never blocks; at most
//! `capacity` jobs run at once and the rest wait for a permit.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    capacity: usize,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            tracker: TaskTracker::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a job; it starts once a permit is free
    pub fn spawn<F>(&self, job: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = self.permits.clone();
        self.tracker.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!(job, "Worker pool closed, dropping job");
                    return;
                }
            };
            future.await;
        });
    }

    /// Jobs queued or running
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every job spawned so far, including ones spawned while waiting
    pub async fn wait_idle(&self) {
        while !self.tracker.is_empty() {
            self.tracker.close();
            self.tracker.wait().await;
            self.tracker.reopen();
        }
    }

    /// Stop accepting jobs and drain the ones in flight
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("Worker pool drained");
    }
}
