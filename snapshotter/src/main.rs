use clap::Parser as _;
use dotenvy::dotenv;
use snapshotter::cli::{Cli, Commands, RunCmd, SnapshotCliArgs};
use snapshotter::core::config::Config;
use snapshotter::types::epoch::EpochInfo;
use snapshotter::utils::logging::init_logging;
use snapshotter::worker::SnapshotWorker;
use snapshotter::SnapshotterResult;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Commands::Commit { run_command, snapshot } => commit_snapshot(run_command, snapshot).await,
        Commands::ProtocolInfo { run_command } => protocol_info(run_command).await,
    };

    match outcome {
        Ok(true) => info!("Done"),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(error = %e, error_chain = ?e, "Snapshotter failed");
            std::process::exit(1);
        }
    }
}

/// Commits one snapshot file. Returns whether the submission was acknowledged.
async fn commit_snapshot(run_cmd: &RunCmd, args: &SnapshotCliArgs) -> SnapshotterResult<bool> {
    let raw = tokio::fs::read(&args.snapshot_file).await?;
    let snapshot: serde_json::Value = serde_json::from_slice(&raw)?;
    debug!(file = %args.snapshot_file.display(), size = raw.len(), "Snapshot loaded");

    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);
    let drain_timeout = config.params().shutdown_drain_timeout;
    let worker = SnapshotWorker::initialize(config).await?;

    let epoch = EpochInfo::new(args.epoch_id, args.epoch_begin, args.epoch_end);
    let committed = tokio::select! {
        receipt = worker.pipeline().commit(&args.task_kind, &args.project_id, &epoch, &snapshot, args.archive) => {
            match &receipt.result {
                Ok(ack) => info!(snapshot_cid = ?receipt.snapshot_cid, ack = %ack.message, "Snapshot committed"),
                Err(e) => error!(snapshot_cid = ?receipt.snapshot_cid, error = %e, "Snapshot commit failed"),
            }
            receipt.is_success()
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning commit");
            false
        }
    };

    let status = worker.status();
    info!(
        successful = status.total_successful_submissions,
        missed = status.total_missed_submissions,
        consecutive_missed = status.consecutive_missed_submissions,
        "Submission status"
    );
    worker.shutdown(drain_timeout).await;
    Ok(committed)
}

/// Resolves protocol metadata and logs it
async fn protocol_info(run_cmd: &RunCmd) -> SnapshotterResult<bool> {
    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);
    let drain_timeout = config.params().shutdown_drain_timeout;
    let worker = SnapshotWorker::initialize(config).await?;

    let metadata = worker.metadata();
    info!(
        chain_id = metadata.chain_id,
        protocol_contract = %metadata.protocol_contract,
        data_market = %metadata.data_market,
        domain_separator = %metadata.domain_separator,
        epoch_size = ?metadata.epoch_size,
        source_chain_block_time = ?metadata.source_chain_block_time,
        signer = %worker.pipeline().signer().identity_address(),
        "Protocol metadata"
    );
    worker.shutdown(drain_timeout).await;
    Ok(true)
}
