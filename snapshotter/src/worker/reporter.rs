use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use serde_json::json;
use tracing::{error, warn};

use crate::core::client::notification::NotificationSink;
use crate::types::status::{SnapshotterIssue, SnapshotterReportData, SnapshotterReportState, SnapshotterStatus};

/// Submission counters, each update applied as one critical section
#[derive(Debug, Default)]
pub struct StatusTracker {
    status: Mutex<SnapshotterStatus>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counters
    pub fn snapshot(&self) -> SnapshotterStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts a successful submission and returns the counters after the update
    pub fn record_success(&self) -> SnapshotterStatus {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.total_successful_submissions += 1;
        status.consecutive_missed_submissions = 0;
        *status
    }

    /// Counts a missed submission and returns the counters after the update
    pub fn record_miss(&self) -> SnapshotterStatus {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.total_missed_submissions += 1;
        status.consecutive_missed_submissions += 1;
        *status
    }
}

/// Accounts commit outcomes and reports every miss to the notification sink.
pub struct FailureReporter {
    instance_id: String,
    status: Arc<StatusTracker>,
    sink: Arc<dyn NotificationSink>,
}

impl FailureReporter {
    pub fn new(instance_id: String, status: Arc<StatusTracker>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { instance_id, status, sink }
    }

    pub fn status(&self) -> SnapshotterStatus {
        self.status.snapshot()
    }

    pub fn record_success(&self) {
        self.status.record_success();
    }

    /// Counts a miss and sends a `MISSED_SNAPSHOT` issue. Sink failures are logged, not returned.
    pub async fn record_failure(&self, project_id: &str, epoch_id: u64, detail: &str) {
        let status = self.status.record_miss();
        warn!(
            project_id,
            epoch_id,
            total_missed = status.total_missed_submissions,
            consecutive_missed = status.consecutive_missed_submissions,
            "Missed snapshot submission"
        );

        let report = self.build_report(project_id, epoch_id, detail, status);
        if let Err(err) = self.sink.send(report).await {
            error!(project_id, epoch_id, error = %err, "Could not deliver missed snapshot report");
        }
    }

    fn build_report(&self, project_id: &str, epoch_id: u64, detail: &str, status: SnapshotterStatus) -> SnapshotterReportData {
        let now = Utc::now();
        let time_of_reporting = format!("{:.6}", now.timestamp_micros() as f64 / 1_000_000.0);
        SnapshotterReportData {
            snapshotter_issue: SnapshotterIssue {
                instance_id: self.instance_id.clone(),
                issue_type: SnapshotterReportState::MissedSnapshot,
                project_id: project_id.to_string(),
                epoch_id: epoch_id.to_string(),
                time_of_reporting,
                extra: json!({ "issueDetails": format!("Error : {}", detail) }).to_string(),
            },
            snapshotter_status: status,
        }
    }
}
