use clap::Args;

/// Identity of this snapshotter: signing key, protocol slot and instance id.
#[derive(Debug, Clone, Args)]
pub struct SignerCliArgs {
    /// Private key (hex, with or without `0x`) used to sign submissions.
    #[arg(env = "SNAPSHOTTER_SIGNER_PRIVATE_KEY", long, hide_env_values = true)]
    pub signer_private_key: Option<String>,

    /// Slot id assigned to this snapshotter by the protocol.
    #[arg(env = "SNAPSHOTTER_SLOT_ID", long)]
    pub slot_id: Option<u64>,

    /// Instance id reported along with missed snapshot issues.
    #[arg(env = "SNAPSHOTTER_INSTANCE_ID", long)]
    pub instance_id: Option<String>,
}
