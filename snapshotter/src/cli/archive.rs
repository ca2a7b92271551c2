use clap::Args;
use url::Url;

/// Best-effort archival of committed snapshots to a web3.storage compatible service.
#[derive(Debug, Clone, Args)]
pub struct ArchiveCliArgs {
    /// Base URL of the archival service.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_URL", long, default_value = "https://api.web3.storage")]
    pub web3_storage_url: Url,

    /// Path appended to the base URL for uploads.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_UPLOAD_SUFFIX", long, default_value = "/upload")]
    pub web3_storage_upload_suffix: String,

    /// Bearer token. Archival is disabled when it is not set.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_API_TOKEN", long, hide_env_values = true)]
    pub web3_storage_api_token: Option<String>,

    /// Maximum idle connections kept per host.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_MAX_IDLE_CONNS", long, default_value = "10")]
    pub web3_storage_max_idle_conns: usize,

    /// Seconds an idle pooled connection is kept.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_IDLE_CONN_TIMEOUT_SECS", long, default_value = "5")]
    pub web3_storage_idle_conn_timeout_secs: u64,

    /// Timeout of a single upload request, in seconds.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_TIMEOUT_SECS", long, default_value = "30")]
    pub web3_storage_timeout_secs: u64,

    /// Attempts made before an archival upload is abandoned.
    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_RETRY_ATTEMPTS", long, default_value = "5")]
    pub web3_storage_retry_attempts: u32,

    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_RETRY_BASE_DELAY_MS", long, default_value = "1000")]
    pub web3_storage_retry_base_delay_ms: u64,

    #[arg(env = "SNAPSHOTTER_WEB3_STORAGE_RETRY_MAX_DELAY_MS", long, default_value = "10000")]
    pub web3_storage_retry_max_delay_ms: u64,
}
