use std::sync::Arc;

use tracing::info;

use crate::cli::RunCmd;
use crate::core::background::BackgroundTasks;
use crate::core::client::chain::EthAnchorClient;
use crate::core::client::collector::GrpcCollectorConnector;
use crate::core::client::notification::{DetachedNotificationSink, HttpNotificationSink};
use crate::core::client::storage::{IpfsContentStore, Web3StorageArchive};
use crate::core::client::{AnchorChainClient, ArchiveStore, CollectorConnector, ContentStore, NotificationSink};
use crate::types::params::reporting::NotificationMode;
use crate::types::params::SnapshotterParams;
use crate::SnapshotterResult;

/// Validated params plus every external client the worker talks to.
///
/// Clients sit behind trait objects so tests can swap any of them.
pub struct Config {
    params: SnapshotterParams,
    anchor_chain: Arc<dyn AnchorChainClient>,
    content_store: Option<Arc<dyn ContentStore>>,
    archive_store: Option<Arc<dyn ArchiveStore>>,
    collector: Arc<dyn CollectorConnector>,
    notifications: Arc<dyn NotificationSink>,
    background_tasks: BackgroundTasks,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        params: SnapshotterParams,
        anchor_chain: Arc<dyn AnchorChainClient>,
        content_store: Option<Arc<dyn ContentStore>>,
        archive_store: Option<Arc<dyn ArchiveStore>>,
        collector: Arc<dyn CollectorConnector>,
        notifications: Arc<dyn NotificationSink>,
        background_tasks: BackgroundTasks,
    ) -> Self {
        Self { params, anchor_chain, content_store, archive_store, collector, notifications, background_tasks }
    }

    /// Validates the command line and builds the production clients.
    ///
    /// Must run inside a Tokio runtime: the collector channel spawns its connection task.
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> SnapshotterResult<Self> {
        let params = SnapshotterParams::try_from(run_cmd)?;
        let background_tasks = BackgroundTasks::new();

        let anchor_chain: Arc<dyn AnchorChainClient> = Arc::new(EthAnchorClient::new(
            params.protocol.anchor_rpc_url.clone(),
            params.protocol.protocol_state_contract,
            params.protocol.rpc_timeout,
        ));

        let content_store: Option<Arc<dyn ContentStore>> = match &params.content_storage.ipfs_url {
            Some(url) => Some(Arc::new(IpfsContentStore::new(url, params.content_storage.timeout)?)),
            None => {
                info!("No IPFS URL configured, content ids will be computed locally");
                None
            }
        };

        let archive_store: Option<Arc<dyn ArchiveStore>> = match &params.archive_storage {
            Some(archive) => Some(Arc::new(Web3StorageArchive::new(archive)?)),
            None => {
                info!("No archival token configured, archival uploads disabled");
                None
            }
        };

        let collector: Arc<dyn CollectorConnector> = Arc::new(GrpcCollectorConnector::connect_lazy(
            &params.collector.endpoint(),
            params.collector.connect_timeout,
        )?);

        let http_sink: Arc<dyn NotificationSink> =
            Arc::new(HttpNotificationSink::new(params.reporting.endpoints(), params.reporting.timeout)?);
        let notifications: Arc<dyn NotificationSink> = match params.reporting.mode {
            NotificationMode::Awaited => http_sink,
            NotificationMode::Detached => Arc::new(DetachedNotificationSink::new(http_sink, background_tasks.clone())),
        };

        Ok(Self::new(params, anchor_chain, content_store, archive_store, collector, notifications, background_tasks))
    }

    pub fn params(&self) -> &SnapshotterParams {
        &self.params
    }

    pub fn anchor_chain(&self) -> &Arc<dyn AnchorChainClient> {
        &self.anchor_chain
    }

    pub fn content_store(&self) -> Option<&Arc<dyn ContentStore>> {
        self.content_store.as_ref()
    }

    pub fn archive_store(&self) -> Option<&Arc<dyn ArchiveStore>> {
        self.archive_store.as_ref()
    }

    pub fn collector(&self) -> &Arc<dyn CollectorConnector> {
        &self.collector
    }

    pub fn notifications(&self) -> &Arc<dyn NotificationSink> {
        &self.notifications
    }

    /// Tracker of detached archival and reporting tasks
    pub fn background_tasks(&self) -> &BackgroundTasks {
        &self.background_tasks
    }
}
