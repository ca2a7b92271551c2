use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::core::background::BackgroundTasks;
use crate::types::epoch::EpochInfo;
use crate::utils::canonical::to_canonical_bytes;
use crate::worker::channel::{SubmissionAck, SubmissionChannel, SubmissionError};
use crate::worker::reporter::FailureReporter;
use crate::worker::signer::{SignatureService, SigningError};
use crate::worker::uploader::{StorageUploader, UploadError};

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Snapshot could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Submission could not be signed: {0}")]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl CommitError {
    /// Whether this outcome was counted as a missed submission
    pub fn is_missed_submission(&self) -> bool {
        match self {
            CommitError::Serialization(_) => false,
            CommitError::Upload(_) | CommitError::Signing(_) => true,
            CommitError::Submission(err) => err.is_delivery_failure(),
        }
    }
}

/// Outcome of one commit.
///
/// The content id is set whenever the upload succeeded, even if signing or submission failed.
#[derive(Debug)]
pub struct CommitReceipt {
    pub snapshot_cid: Option<String>,
    pub result: Result<SubmissionAck, CommitError>,
}

impl CommitReceipt {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One in-flight commit: the canonical snapshot and what it is a snapshot of
struct PendingCommit<'a> {
    project_id: &'a str,
    epoch: &'a EpochInfo,
    payload: Bytes,
    archive: bool,
}

/// Upload, sign, submit, account. Commits for different projects run concurrently; the
/// steps of one commit are strictly sequential.
pub struct CommitPipeline {
    uploader: Arc<StorageUploader>,
    signer: SignatureService,
    channel: Arc<SubmissionChannel>,
    reporter: FailureReporter,
    background: BackgroundTasks,
}

impl CommitPipeline {
    pub fn new(
        uploader: Arc<StorageUploader>,
        signer: SignatureService,
        channel: Arc<SubmissionChannel>,
        reporter: FailureReporter,
        background: BackgroundTasks,
    ) -> Self {
        Self { uploader, signer, channel, reporter, background }
    }

    pub fn reporter(&self) -> &FailureReporter {
        &self.reporter
    }

    pub fn signer(&self) -> &SignatureService {
        &self.signer
    }

    /// Commits `snapshot` as the snapshot of `project_id` for `epoch`.
    ///
    /// A failed upload skips submission. Upload, signing and delivery failures are each counted
    /// and reported once, including statuses the collector sends back; an unacknowledged or
    /// caller-abandoned submission is neither. With `archive`
    /// set, the canonical bytes are handed to the archival store in the background, whatever
    /// the outcome.
    #[instrument(
        name = "commit",
        skip_all,
        fields(project_id = %project_id, epoch_id = epoch.epoch_id, task_kind = %task_kind, simulation = epoch.is_simulation())
    )]
    pub async fn commit<S>(&self, task_kind: &str, project_id: &str, epoch: &EpochInfo, snapshot: &S, archive: bool) -> CommitReceipt
    where
        S: Serialize + ?Sized,
    {
        let payload = match to_canonical_bytes(snapshot) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                error!(error = %err, "Snapshot is not serializable, nothing committed");
                return CommitReceipt { snapshot_cid: None, result: Err(err.into()) };
            }
        };
        let pending = PendingCommit { project_id, epoch, payload, archive };

        let receipt = self.upload_and_submit(&pending).await;

        if pending.archive && self.uploader.archival_enabled() {
            let uploader = Arc::clone(&self.uploader);
            let payload = pending.payload.clone();
            self.background.spawn("archive", async move { uploader.archive(payload).await });
        }

        receipt
    }

    async fn upload_and_submit(&self, pending: &PendingCommit<'_>) -> CommitReceipt {
        let snapshot_cid = match self.uploader.upload(&pending.payload).await {
            Ok(cid) => cid,
            Err(err) => {
                error!(attempts = err.attempts(), error = %err, "Snapshot upload failed, skipping submission");
                self.reporter.record_failure(pending.project_id, pending.epoch.epoch_id, &err.to_string()).await;
                return CommitReceipt { snapshot_cid: None, result: Err(err.into()) };
            }
        };
        info!(snapshot_cid = %snapshot_cid, "Snapshot stored");

        let result = self.submit(pending, &snapshot_cid).await;
        match &result {
            Ok(_) => self.reporter.record_success(),
            Err(err) if err.is_missed_submission() => {
                self.reporter.record_failure(pending.project_id, pending.epoch.epoch_id, &err.to_string()).await;
            }
            Err(err) => info!(error = %err, "Submission abandoned, not counted as missed"),
        }

        CommitReceipt { snapshot_cid: Some(snapshot_cid), result }
    }

    async fn submit(&self, pending: &PendingCommit<'_>, snapshot_cid: &str) -> Result<SubmissionAck, CommitError> {
        let signed = self
            .signer
            .generate(snapshot_cid, pending.epoch.epoch_id, pending.project_id, None, None)
            .await
            .inspect_err(|err| error!(error = %err, "Could not sign submission"))?;

        if pending.epoch.is_simulation() {
            info!(snapshot_cid, deadline = signed.request.deadline, "Submitting simulation (dry run) snapshot");
        }

        let ack = self.channel.submit(signed.into_message(), pending.epoch.is_simulation()).await?;
        Ok(ack)
    }
}
