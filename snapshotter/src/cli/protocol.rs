use clap::Args;
use url::Url;

/// Anchor chain access and protocol contract coordinates.
#[derive(Debug, Clone, Args)]
pub struct ProtocolCliArgs {
    /// JSON-RPC endpoint of the anchor chain.
    #[arg(env = "SNAPSHOTTER_ANCHOR_RPC_URL", long)]
    pub anchor_rpc_url: Option<Url>,

    /// Chain id of the anchor chain. Fetched with `eth_chainId` when absent.
    #[arg(env = "SNAPSHOTTER_ANCHOR_CHAIN_ID", long)]
    pub anchor_chain_id: Option<u64>,

    /// Timeout of a single anchor chain RPC request, in seconds.
    #[arg(env = "SNAPSHOTTER_ANCHOR_RPC_TIMEOUT_SECS", long, default_value = "10")]
    pub anchor_rpc_timeout_secs: u64,

    /// Address of the protocol state contract, the EIP-712 verifying contract.
    #[arg(env = "SNAPSHOTTER_PROTOCOL_STATE_CONTRACT", long)]
    pub protocol_state_contract: Option<String>,

    /// Address of the data market this snapshotter submits to.
    #[arg(env = "SNAPSHOTTER_DATA_MARKET_CONTRACT", long)]
    pub data_market_contract: Option<String>,

    /// Number of anchor chain blocks a signed submission stays valid for.
    #[arg(env = "SNAPSHOTTER_DEADLINE_BUFFER", long, default_value = "120")]
    pub deadline_buffer: u64,
}
