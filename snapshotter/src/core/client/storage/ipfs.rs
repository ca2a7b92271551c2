use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{ContentStore, StorageError};

const OPERATION: &str = "ipfs_add";

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Client of the IPFS HTTP API `add` endpoint
pub struct IpfsContentStore {
    client: reqwest::Client,
    add_url: Url,
}

impl IpfsContentStore {
    pub fn new(api_url: &Url, timeout: Duration) -> Result<Self, StorageError> {
        let base = api_url.as_str().trim_end_matches('/');
        let mut add_url = Url::parse(&format!("{}/api/v0/add", base))
            .map_err(|e| StorageError::Configuration(format!("invalid IPFS URL {}: {}", api_url, e)))?;
        add_url.query_pairs_mut().append_pair("cid-version", "1");

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        Ok(Self { client, add_url })
    }
}

#[async_trait]
impl ContentStore for IpfsContentStore {
    async fn add_bytes(&self, data: Bytes) -> Result<String, StorageError> {
        let size = data.len();
        let form = Form::new().part("file", Part::bytes(data.to_vec()).file_name("snapshot.json"));

        let response = self
            .client
            .post(self.add_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::from_reqwest(OPERATION, e))?;

        let status = response.status();
        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { operation: OPERATION, status, message });
        }
        if !status.is_success() {
            return Err(StorageError::Unavailable { operation: OPERATION, status });
        }

        let added: AddResponse = response.json().await.map_err(|e| StorageError::from_reqwest(OPERATION, e))?;
        debug!(cid = %added.hash, size, "Snapshot added to IPFS");
        Ok(added.hash)
    }
}
