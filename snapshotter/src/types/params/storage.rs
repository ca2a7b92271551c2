use std::time::Duration;

use snapshotter_resilience::RetryPolicy;
use url::Url;

use crate::cli::archive::ArchiveCliArgs;
use crate::cli::storage::IpfsCliArgs;

#[derive(Debug, Clone)]
pub struct ContentStorageParams {
    /// `None` selects local content id computation
    pub ipfs_url: Option<Url>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl From<&IpfsCliArgs> for ContentStorageParams {
    fn from(args: &IpfsCliArgs) -> Self {
        Self {
            ipfs_url: args.ipfs_url.clone(),
            timeout: Duration::from_secs(args.ipfs_timeout_secs),
            retry: RetryPolicy::new(
                args.ipfs_retry_attempts,
                Duration::from_millis(args.ipfs_retry_base_delay_ms),
                Duration::from_millis(args.ipfs_retry_max_delay_ms),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveStorageParams {
    pub url: Url,
    pub upload_suffix: String,
    pub api_token: String,
    pub max_idle_conns: usize,
    pub idle_conn_timeout: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ArchiveStorageParams {
    /// Archival is only enabled when an API token is configured
    pub fn from_cli(args: &ArchiveCliArgs) -> Option<Self> {
        let api_token = args.web3_storage_api_token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some(Self {
            url: args.web3_storage_url.clone(),
            upload_suffix: args.web3_storage_upload_suffix.clone(),
            api_token: api_token.to_string(),
            max_idle_conns: args.web3_storage_max_idle_conns,
            idle_conn_timeout: Duration::from_secs(args.web3_storage_idle_conn_timeout_secs),
            timeout: Duration::from_secs(args.web3_storage_timeout_secs),
            retry: RetryPolicy::new(
                args.web3_storage_retry_attempts,
                Duration::from_millis(args.web3_storage_retry_base_delay_ms),
                Duration::from_millis(args.web3_storage_retry_max_delay_ms),
            ),
        })
    }
}
