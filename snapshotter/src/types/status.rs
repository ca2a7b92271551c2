use serde::{Deserialize, Serialize};

/// Submission counters of this snapshotter instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotterStatus {
    pub total_successful_submissions: u64,
    pub total_missed_submissions: u64,
    pub consecutive_missed_submissions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotterReportState {
    MissedSnapshot,
}

/// A single failed commit, as reported to the issue endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotterIssue {
    #[serde(rename = "instanceID")]
    pub instance_id: String,
    #[serde(rename = "issueType")]
    pub issue_type: SnapshotterReportState,
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(rename = "epochId")]
    pub epoch_id: String,
    #[serde(rename = "timeOfReporting")]
    pub time_of_reporting: String,
    /// JSON encoded `{"issueDetails": ...}`
    pub extra: String,
}

/// Body POSTed to the reporting service for every missed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotterReportData {
    pub snapshotter_issue: SnapshotterIssue,
    pub snapshotter_status: SnapshotterStatus,
}
