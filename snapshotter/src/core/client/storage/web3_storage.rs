use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use url::Url;

use super::{ArchiveStore, StorageError};
use crate::types::params::ArchiveStorageParams;

const OPERATION: &str = "web3_storage_upload";

/// Bearer-authenticated multipart upload to a web3.storage compatible service
pub struct Web3StorageArchive {
    client: reqwest::Client,
    upload_url: Url,
}

impl Web3StorageArchive {
    pub fn new(params: &ArchiveStorageParams) -> Result<Self, StorageError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", params.api_token))
            .map_err(|e| StorageError::Configuration(format!("invalid archival token: {}", e)))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(params.timeout)
            .pool_max_idle_per_host(params.max_idle_conns)
            .pool_idle_timeout(params.idle_conn_timeout)
            .build()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        let base = params.url.as_str().trim_end_matches('/');
        let upload_url = Url::parse(&format!("{}{}", base, params.upload_suffix))
            .map_err(|e| StorageError::Configuration(format!("invalid archival upload URL: {}", e)))?;

        Ok(Self { client, upload_url })
    }
}

#[async_trait]
impl ArchiveStore for Web3StorageArchive {
    async fn store(&self, data: Bytes) -> Result<serde_json::Value, StorageError> {
        let form = Form::new().part("file", Part::bytes(data.to_vec()));
        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::from_reqwest(OPERATION, e))?;

        // Any error status is final, only transport failures are retried
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected { operation: OPERATION, status, message });
        }

        response.json().await.map_err(|e| StorageError::from_reqwest(OPERATION, e))
    }
}
