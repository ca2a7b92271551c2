use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn, Instrument, Span};

/// Detached archival and reporting work.
///
/// Every task runs in the span it was spawned from and stops early once [`drain`] gives up
/// waiting for it.
///
/// [`drain`]: BackgroundTasks::drain
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let task = async move {
            tokio::select! {
                _ = cancel.cancelled() => warn!(task = name, "Background task cancelled"),
                _ = task => debug!(task = name, "Background task finished"),
            }
        };
        self.tracker.spawn(task.instrument(Span::current()));
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Stops accepting work and waits up to `timeout` for running tasks. Whatever is still
    /// running afterwards is cancelled. Returns whether everything finished on its own.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok() {
            return true;
        }
        warn!(pending = self.tracker.len(), ?timeout, "Cancelling background tasks still running at shutdown");
        self.cancel.cancel();
        self.tracker.wait().await;
        false
    }
}
