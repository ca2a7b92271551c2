use clap::Args;
use std::path::PathBuf;

/// The snapshot committed by the `commit` subcommand.
#[derive(Debug, Clone, Args)]
pub struct SnapshotCliArgs {
    /// JSON file holding the snapshot payload.
    #[arg(long, value_name = "PATH")]
    pub snapshot_file: PathBuf,

    /// Project the snapshot belongs to, e.g. `pairContract_trade_volume:0xabc:UNISWAPV2`.
    #[arg(long)]
    pub project_id: String,

    #[arg(long)]
    pub epoch_id: u64,

    /// First source chain block of the epoch.
    #[arg(long, default_value = "0")]
    pub epoch_begin: u64,

    /// Last source chain block of the epoch.
    #[arg(long, default_value = "0")]
    pub epoch_end: u64,

    /// Kind of processing task that produced the snapshot.
    #[arg(long, default_value = "snapshot")]
    pub task_kind: String,

    /// Also upload the snapshot to the archival service.
    #[arg(long)]
    pub archive: bool,
}
