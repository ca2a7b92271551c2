pub mod detached;
pub mod error;
pub mod http;

use async_trait::async_trait;

pub use detached::DetachedNotificationSink;
pub use error::NotificationError;
pub use http::HttpNotificationSink;

use crate::types::status::SnapshotterReportData;

/// Destination of missed snapshot reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, report: SnapshotterReportData) -> Result<(), NotificationError>;
}
