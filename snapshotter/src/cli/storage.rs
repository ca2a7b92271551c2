use clap::Args;
use url::Url;

/// Content-addressed storage. Without an API URL, content ids are computed locally.
#[derive(Debug, Clone, Args)]
pub struct IpfsCliArgs {
    /// Base URL of an IPFS HTTP API, e.g. http://127.0.0.1:5001
    #[arg(env = "SNAPSHOTTER_IPFS_URL", long)]
    pub ipfs_url: Option<Url>,

    /// Timeout of a single upload request, in seconds.
    #[arg(env = "SNAPSHOTTER_IPFS_TIMEOUT_SECS", long, default_value = "60")]
    pub ipfs_timeout_secs: u64,

    /// Attempts made before an upload is reported as failed.
    #[arg(env = "SNAPSHOTTER_IPFS_RETRY_ATTEMPTS", long, default_value = "5")]
    pub ipfs_retry_attempts: u32,

    /// Base delay of the upload backoff, in milliseconds.
    #[arg(env = "SNAPSHOTTER_IPFS_RETRY_BASE_DELAY_MS", long, default_value = "1000")]
    pub ipfs_retry_base_delay_ms: u64,

    /// Cap of the upload backoff, in milliseconds.
    #[arg(env = "SNAPSHOTTER_IPFS_RETRY_MAX_DELAY_MS", long, default_value = "10000")]
    pub ipfs_retry_max_delay_ms: u64,
}
