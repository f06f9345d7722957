use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::kernel::BaseBlobStore;

/// HTTP client for an S3-compatible object-storage API.
///
/// Objects live under a single bucket; keys are opaque strings chosen by the
/// proof-store adapter. The service exposes signed-write endpoints under
/// `/object/{bucket}/{key}` and unauthenticated reads under
/// `/object/public/{bucket}/{key}`.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct CopyRequest<'a> {
    bucket: &'a str,
    source_key: &'a str,
    destination_key: &'a str,
}

impl HttpBlobStore {
    pub fn new(base_url: String, bucket: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            api_key,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, key)
    }
}

#[async_trait]
impl BaseBlobStore for HttpBlobStore {
    async fn blob_upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        info!("Uploading blob: {} ({} bytes)", key, bytes.len());

        let response = self
            .client
            .post(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", content_type.to_string())
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("storage upload failed {}: {}", status, body);
        }
        Ok(())
    }

    async fn blob_copy(&self, src_key: &str, dst_key: &str) -> Result<()> {
        info!("Copying blob: {} -> {}", src_key, dst_key);

        let request = CopyRequest {
            bucket: &self.bucket,
            source_key: src_key,
            destination_key: dst_key,
        };

        let response = self
            .client
            .post(format!("{}/object/copy", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("storage copy failed {}: {}", status, body);
        }
        Ok(())
    }

    async fn blob_delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("storage delete failed {}", status);
        }
        Ok(())
    }

    fn blob_public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, key)
    }
}
