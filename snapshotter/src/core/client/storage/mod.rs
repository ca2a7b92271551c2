pub mod error;
pub mod ipfs;
pub mod web3_storage;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::StorageError;
pub use ipfs::IpfsContentStore;
pub use web3_storage::Web3StorageArchive;

/// Content-addressed storage returning the id it stored the payload under.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn add_bytes(&self, data: Bytes) -> Result<String, StorageError>;
}

/// Archival service keeping a copy of committed snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Uploads `data`, returning the service's JSON acknowledgement
    async fn store(&self, data: Bytes) -> Result<serde_json::Value, StorageError>;
}
