//! Bounded executor for background pipelines.
//!
//! Spawning never blocks the caller. Each spawned unit waits for a
//! semaphore permit before it starts, so at most `max_concurrent` pipelines
//! hold AI calls, timers and database connections at the same time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dramagen_core::task::TaskKind;
use dramagen_core::types::TaskId;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Runs pipelines with a concurrency ceiling and tracks them for shutdown.
#[derive(Clone)]
pub struct TaskRunner {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    max_concurrent: usize,
}

impl TaskRunner {
    /// Create a runner allowing `max_concurrent` pipelines at once (minimum 1).
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            tracker: TaskTracker::new(),
            max_concurrent,
        }
    }

    /// Queue `work` for the task. Returns immediately.
    pub fn spawn<F>(&self, task_id: TaskId, kind: TaskKind, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let span = tracing::info_span!("task", %task_id, %kind);

        self.tracker.spawn(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    tracing::warn!("Task runner closed before the task could start");
                    return;
                };
                tracing::debug!("Task started");
                work.await;
                tracing::debug!("Task finished");
            }
            .instrument(span),
        );
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Pipelines that are running or waiting for a permit.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait for in-flight work.
    ///
    /// Returns `false` if work was still running when `timeout` elapsed.
    /// Nothing is cancelled; unfinished pipelines keep their tasks
    /// non-terminal.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let in_flight = self.tracker.len();
        if in_flight > 0 {
            tracing::info!(in_flight, "Waiting for background tasks to finish");
        }
        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    remaining = self.tracker.len(),
                    "Background tasks still running after shutdown timeout"
                );
                false
            }
        }
    }
}
