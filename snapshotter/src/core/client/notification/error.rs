use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Failed to deliver report to {endpoint}: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Report endpoint {endpoint} answered with status {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("Failed to build notification client: {0}")]
    Client(#[source] reqwest::Error),
}
