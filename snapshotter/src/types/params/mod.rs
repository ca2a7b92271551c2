pub mod collector;
pub mod protocol;
pub mod reporting;
pub mod signer;
pub mod storage;

use std::time::Duration;

use crate::cli::RunCmd;
use crate::SnapshotterError;

pub use collector::CollectorParams;
pub use protocol::ProtocolParams;
pub use reporting::ReportingParams;
pub use signer::SignerParams;
pub use storage::{ArchiveStorageParams, ContentStorageParams};

/// Validated configuration of a snapshotter worker.
///
/// Built from the command line once, before any client is constructed. Everything past this
/// point can assume addresses, URLs and keys are well-formed.
#[derive(Debug, Clone)]
pub struct SnapshotterParams {
    pub signer: SignerParams,
    pub protocol: ProtocolParams,
    pub content_storage: ContentStorageParams,
    /// `None` when archival is disabled
    pub archive_storage: Option<ArchiveStorageParams>,
    pub collector: CollectorParams,
    pub reporting: ReportingParams,
    pub shutdown_drain_timeout: Duration,
}

impl TryFrom<&RunCmd> for SnapshotterParams {
    type Error = SnapshotterError;

    fn try_from(run_cmd: &RunCmd) -> Result<Self, Self::Error> {
        Ok(Self {
            signer: SignerParams::try_from(&run_cmd.signer_args)?,
            protocol: ProtocolParams::try_from(&run_cmd.protocol_args)?,
            content_storage: ContentStorageParams::from(&run_cmd.ipfs_args),
            archive_storage: ArchiveStorageParams::from_cli(&run_cmd.archive_args),
            collector: CollectorParams::try_from(&run_cmd.collector_args)?,
            reporting: ReportingParams::from(&run_cmd.reporting_args),
            shutdown_drain_timeout: Duration::from_secs(run_cmd.shutdown_drain_timeout_secs),
        })
    }
}
