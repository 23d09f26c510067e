//! Timer-delayed, fire-and-forget tasks.
use std::future::Future;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};

/// Handle to a deferred task. Dropping it does not cancel the task; `cancel`
/// does, as long as the delay has not elapsed yet.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `work` on the runtime after `delay`. Must be called from within a
    /// tokio runtime.
    pub fn after<F>(delay: Duration, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task; used by tests and graceful shutdown.
    pub async fn join(self) -> Result<(), JoinError> {
        self.handle.await
    }
}
