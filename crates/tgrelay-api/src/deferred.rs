//! Work that outlives the response.
//!
//! Access logging, rating lookups and counter bumps run after the client has
//! its answer. They are fire-and-forget: no retry, no ordering between tasks,
//! and failures are only visible in the logs.

use std::future::Future;

use tokio_util::task::TaskTracker;

#[derive(Clone, Default)]
pub struct DeferredTasks {
    tracker: TaskTracker,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` in the background. Its error, if any, is logged and dropped.
    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.tracker.spawn(async move {
            match task.await {
                Ok(()) => tracing::debug!(task = label, "Deferred task finished"),
                Err(e) => tracing::warn!(task = label, error = %e, "Deferred task failed"),
            }
        });
    }

    /// Number of tasks still running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned so far has finished.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn drain_waits_for_every_task() {
        let tasks = DeferredTasks::new();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = done.clone();
            tasks.spawn("count", async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        tasks.drain().await;

        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let tasks = DeferredTasks::new();
        tasks.spawn("fails", async { Err(anyhow::anyhow!("store unavailable")) });
        tasks.drain().await;

        // still usable after a drain
        let ran = Arc::new(AtomicUsize::new(0));
        let flag = ran.clone();
        tasks.spawn("after", async move {
            flag.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        tasks.drain().await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
