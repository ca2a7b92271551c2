use std::sync::Arc;

use bytes::Bytes;
use snapshotter_resilience::{RetryError, RetryPolicy};
use tracing::{debug, error, info};

use crate::core::client::storage::{ArchiveStore, ContentStore, StorageError};
use crate::utils::cid::local_content_id;

pub type UploadError = RetryError<StorageError>;

/// Upload paths of a committed snapshot.
///
/// The content path decides the snapshot's content id and is retried under its own policy.
/// The archival path is best effort: it is retried under a separate policy and its failures are
/// only logged.
pub struct StorageUploader {
    content_store: Option<Arc<dyn ContentStore>>,
    content_policy: RetryPolicy,
    archive_store: Option<Arc<dyn ArchiveStore>>,
    archive_policy: RetryPolicy,
}

impl StorageUploader {
    pub fn new(
        content_store: Option<Arc<dyn ContentStore>>,
        content_policy: RetryPolicy,
        archive_store: Option<Arc<dyn ArchiveStore>>,
        archive_policy: RetryPolicy,
    ) -> Self {
        Self { content_store, content_policy, archive_store, archive_policy }
    }

    pub fn archival_enabled(&self) -> bool {
        self.archive_store.is_some()
    }

    /// Content id of `snapshot`. Computed locally, without any network call, when no content
    /// store is configured.
    pub async fn upload(&self, snapshot: &Bytes) -> Result<String, UploadError> {
        let Some(store) = &self.content_store else {
            let cid = local_content_id(snapshot);
            debug!(snapshot_cid = %cid, "Computed content id locally");
            return Ok(cid);
        };

        let cid = self.content_policy.run("content_upload", |_| store.add_bytes(snapshot.clone())).await?;
        debug!(snapshot_cid = %cid, size = snapshot.len(), "Snapshot uploaded to content store");
        Ok(cid)
    }

    /// Uploads `snapshot` to the archival store, if one is configured. Never fails.
    pub async fn archive(&self, snapshot: Bytes) {
        let Some(store) = &self.archive_store else {
            return;
        };

        match self.archive_policy.run("archive_upload", |_| store.store(snapshot.clone())).await {
            Ok(ack) => info!(ack = %ack, size = snapshot.len(), "Snapshot archived"),
            Err(err) => error!(attempts = err.attempts(), error = %err, "Archival upload abandoned"),
        }
    }
}
