use clap::{Parser, Subcommand};

pub mod archive;
pub mod collector;
pub mod protocol;
pub mod reporting;
pub mod signer;
pub mod snapshot;
pub mod storage;

#[derive(Parser, Debug)]
#[command(
    name = "snapshotter",
    about = "Powerloom snapshotter - commit snapshots and submit signed claims to the local collector",
    after_help = "Examples:\n  \
    snapshotter protocol-info --anchor-rpc-url http://localhost:8545 ...\n  \
    snapshotter commit --snapshot-file snapshot.json --project-id <id> --epoch-id 42 ..."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Commit a snapshot file: upload it, sign the claim and submit it to the collector
    Commit {
        #[command(flatten)]
        run_command: Box<RunCmd>,

        #[command(flatten)]
        snapshot: SnapshotCliArgs,
    },
    /// Resolve protocol metadata from the anchor chain and log it
    ProtocolInfo {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
}

pub use snapshot::SnapshotCliArgs;

#[derive(Parser, Debug, Clone)]
pub struct RunCmd {
    #[clap(flatten, next_help_heading = "Signer")]
    pub signer_args: signer::SignerCliArgs,

    #[clap(flatten, next_help_heading = "Protocol")]
    pub protocol_args: protocol::ProtocolCliArgs,

    #[clap(flatten, next_help_heading = "Content storage")]
    pub ipfs_args: storage::IpfsCliArgs,

    #[clap(flatten, next_help_heading = "Archival storage")]
    pub archive_args: archive::ArchiveCliArgs,

    #[clap(flatten, next_help_heading = "Collector")]
    pub collector_args: collector::CollectorCliArgs,

    #[clap(flatten, next_help_heading = "Reporting")]
    pub reporting_args: reporting::ReportingCliArgs,

    /// Seconds to wait for background archival and reporting work on shutdown.
    #[arg(env = "SNAPSHOTTER_SHUTDOWN_DRAIN_TIMEOUT_SECS", long, default_value = "30")]
    pub shutdown_drain_timeout_secs: u64,
}
