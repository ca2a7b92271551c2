use reqwest::StatusCode;
use snapshotter_resilience::Retryable;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Network error during {operation}: {message}")]
    Network { operation: &'static str, message: String },

    /// The backend refused the payload; retrying cannot help
    #[error("{operation} rejected with status {status}: {message}")]
    Rejected { operation: &'static str, status: StatusCode, message: String },

    #[error("{operation} failed with status {status}")]
    Unavailable { operation: &'static str, status: StatusCode },

    #[error("Unexpected response to {operation}: {message}")]
    InvalidResponse { operation: &'static str, message: String },

    #[error("Invalid storage client configuration: {0}")]
    Configuration(String),
}

impl StorageError {
    pub fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            StorageError::InvalidResponse { operation, message: err.to_string() }
        } else if err.is_builder() {
            StorageError::Configuration(err.to_string())
        } else {
            StorageError::Network { operation, message: err.to_string() }
        }
    }
}

impl Retryable for StorageError {
    /// Only an explicit refusal or a misconfigured client is final
    fn is_retryable(&self) -> bool {
        !matches!(self, StorageError::Rejected { .. } | StorageError::Configuration(_))
    }
}
