use thiserror::Error;

use crate::core::client::chain::ChainError;
use crate::core::client::collector::CollectorError;
use crate::core::client::notification::NotificationError;
use crate::core::client::storage::StorageError;
use crate::worker::signer::SigningError;

/// Result type for snapshotter setup and lifecycle operations
pub type SnapshotterResult<T> = Result<T, SnapshotterError>;

/// Errors raised while configuring, initializing or shutting down the worker.
///
/// Per-commit failures never surface here; they are reported through
/// [`crate::worker::commit::CommitReceipt`].
#[derive(Error, Debug)]
pub enum SnapshotterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Anchor chain error: {0}")]
    ChainError(#[from] ChainError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Collector error: {0}")]
    CollectorError(#[from] CollectorError),

    #[error("Notification error: {0}")]
    NotificationError(#[from] NotificationError),

    #[error("Signing error: {0}")]
    SigningError(#[from] SigningError),

    #[error("Snapshot file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
