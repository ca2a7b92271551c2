pub mod error;
pub mod grpc;
pub mod proto;

use async_trait::async_trait;

pub use error::CollectorError;
pub use grpc::GrpcCollectorConnector;
use proto::{SnapshotSubmission, SubmissionResponse};

/// One open `SubmitSnapshot` stream.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStream: Send {
    async fn send_message(&mut self, message: SnapshotSubmission) -> Result<(), CollectorError>;

    /// Next acknowledgement, `None` once the collector ended the stream
    async fn recv_message(&mut self) -> Result<Option<SubmissionResponse>, CollectorError>;

    /// Tears the stream down; it must not be used afterwards
    async fn cancel(&mut self) -> Result<(), CollectorError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectorConnector: Send + Sync {
    async fn open_stream(&self) -> Result<Box<dyn SubmissionStream>, CollectorError>;
}
