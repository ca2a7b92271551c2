use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use super::{NotificationError, NotificationSink};
use crate::core::background::BackgroundTasks;
use crate::types::status::SnapshotterReportData;

/// Hands every report to a background task so the caller never waits on delivery.
///
/// Delivery errors can only be logged. Tasks are spawned on `tasks`, which the worker drains on
/// shutdown and cancels if they outlast the drain timeout.
pub struct DetachedNotificationSink {
    inner: Arc<dyn NotificationSink>,
    tasks: BackgroundTasks,
}

impl DetachedNotificationSink {
    pub fn new(inner: Arc<dyn NotificationSink>, tasks: BackgroundTasks) -> Self {
        Self { inner, tasks }
    }
}

#[async_trait]
impl NotificationSink for DetachedNotificationSink {
    async fn send(&self, report: SnapshotterReportData) -> Result<(), NotificationError> {
        let inner = Arc::clone(&self.inner);
        self.tasks.spawn("report_delivery", async move {
            let project_id = report.snapshotter_issue.project_id.clone();
            let epoch_id = report.snapshotter_issue.epoch_id.clone();
            if let Err(err) = inner.send(report).await {
                error!(%project_id, %epoch_id, error = %err, "Background report delivery failed");
            }
        });
        Ok(())
    }
}
