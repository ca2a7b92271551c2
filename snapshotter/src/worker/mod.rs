pub mod channel;
pub mod commit;
pub mod metadata;
pub mod reporter;
pub mod signer;
pub mod uploader;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::config::Config;
use crate::types::status::SnapshotterStatus;
use crate::SnapshotterResult;
use channel::{ChannelSettings, SubmissionChannel};
use commit::CommitPipeline;
use metadata::{ProtocolMetadata, ProtocolMetadataCache};
use reporter::{FailureReporter, StatusTracker};
use signer::SignatureService;
use uploader::StorageUploader;

/// A fully wired snapshotter: protocol metadata resolved, pipeline ready to commit.
pub struct SnapshotWorker {
    config: Arc<Config>,
    metadata: ProtocolMetadata,
    pipeline: Arc<CommitPipeline>,
    channel: Arc<SubmissionChannel>,
    shutdown: CancellationToken,
    watchdog: JoinHandle<()>,
}

impl SnapshotWorker {
    /// Resolves protocol metadata and wires the pipeline. Fails only if the anchor chain id can
    /// not be resolved.
    pub async fn initialize(config: Arc<Config>) -> SnapshotterResult<Self> {
        let params = config.params();

        let cache = ProtocolMetadataCache::new();
        let metadata = cache.initialize(config.anchor_chain().as_ref(), &params.protocol).await?.clone();

        let signer = SignatureService::new(
            Arc::clone(config.anchor_chain()),
            params.signer.identity.clone(),
            metadata.domain.clone(),
            params.protocol.deadline_buffer,
            params.signer.slot_id,
        );

        let uploader = Arc::new(StorageUploader::new(
            config.content_store().cloned(),
            params.content_storage.retry,
            config.archive_store().cloned(),
            params.archive_storage.as_ref().map(|archive| archive.retry).unwrap_or_default(),
        ));

        let channel = Arc::new(SubmissionChannel::new(
            Arc::clone(config.collector()),
            ChannelSettings {
                idle_timeout: params.collector.idle_stream_timeout,
                ack_timeout: params.collector.ack_timeout,
                cancel_timeout: params.collector.cancel_timeout,
            },
        ));
        let shutdown = CancellationToken::new();
        let watchdog = channel.spawn_idle_watchdog(shutdown.clone());

        let reporter = FailureReporter::new(
            params.signer.instance_id.clone(),
            Arc::new(StatusTracker::new()),
            Arc::clone(config.notifications()),
        );

        let pipeline = Arc::new(CommitPipeline::new(
            uploader,
            signer,
            Arc::clone(&channel),
            reporter,
            config.background_tasks().clone(),
        ));

        info!(
            signer = %params.signer.address(),
            slot_id = params.signer.slot_id,
            chain_id = metadata.chain_id,
            collector = %params.collector.endpoint(),
            "Snapshot worker initialized"
        );

        Ok(Self { config, metadata, pipeline, channel, shutdown, watchdog })
    }

    pub fn pipeline(&self) -> &Arc<CommitPipeline> {
        &self.pipeline
    }

    pub fn metadata(&self) -> &ProtocolMetadata {
        &self.metadata
    }

    pub fn status(&self) -> SnapshotterStatus {
        self.pipeline.reporter().status()
    }

    /// Stops the idle watchdog, cancels the pooled stream and waits up to `drain_timeout` for
    /// detached archival and reporting tasks before cancelling the rest.
    pub async fn shutdown(self, drain_timeout: Duration) {
        self.shutdown.cancel();
        if let Err(err) = self.watchdog.await {
            warn!(error = %err, "Idle stream watchdog ended abnormally");
        }
        self.channel.close().await;

        if self.config.background_tasks().drain(drain_timeout).await {
            info!("Background tasks drained");
        }
    }
}
