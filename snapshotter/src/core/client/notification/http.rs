use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::{NotificationError, NotificationSink};
use crate::types::status::SnapshotterReportData;

/// POSTs every report as JSON to each configured endpoint, in order
pub struct HttpNotificationSink {
    client: reqwest::Client,
    endpoints: Vec<Url>,
}

impl HttpNotificationSink {
    pub fn new(endpoints: Vec<Url>, timeout: Duration) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(NotificationError::Client)?;
        Ok(Self { client, endpoints })
    }

    async fn post(&self, endpoint: &Url, report: &SnapshotterReportData) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(endpoint.clone())
            .json(report)
            .send()
            .await
            .map_err(|source| NotificationError::Request { endpoint: endpoint.to_string(), source })?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status { endpoint: endpoint.to_string(), status });
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    /// Tries every endpoint even if an earlier one failed; returns the first error
    async fn send(&self, report: SnapshotterReportData) -> Result<(), NotificationError> {
        if self.endpoints.is_empty() {
            debug!("No reporting endpoint configured, dropping report");
            return Ok(());
        }

        let mut first_error = None;
        for endpoint in &self.endpoints {
            match self.post(endpoint, &report).await {
                Ok(()) => debug!(%endpoint, "Report delivered"),
                Err(err) => {
                    warn!(%endpoint, error = %err, "Report delivery failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
