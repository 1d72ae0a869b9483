//! Downloads through presigned object-storage links.

use crate::{ApiClient, ClientResult};
use api_shared::PresignedUrlRes;
use emr_core::CoreError;
use emr_files::{DownloadReceipt, DownloadStore};

#[derive(Clone)]
pub struct StorageApi {
    api: ApiClient,
}

impl StorageApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Asks the backend to sign a short-lived link for `storage_key`.
    ///
    /// Links expire, so they are never cached.
    pub async fn presigned_url(&self, storage_key: &str) -> ClientResult<PresignedUrlRes> {
        let storage_key = storage_key.trim();
        if storage_key.is_empty() {
            return Err(CoreError::InvalidInput("storage key cannot be empty".into()).into());
        }
        self.api
            .get(
                "/storage/presigned-url",
                &[("key", storage_key.to_string())],
            )
            .await
    }

    /// Signs, fetches and stores one object.
    pub async fn download(
        &self,
        storage_key: &str,
        filename: &str,
        store: &DownloadStore,
    ) -> ClientResult<DownloadReceipt> {
        let link = self.presigned_url(storage_key).await?;
        let bytes = self.api.download(&link.url).await?;
        let receipt = store.save(&bytes, filename)?;
        tracing::info!(
            key = storage_key,
            path = %receipt.path.display(),
            bytes = receipt.size_bytes,
            "file downloaded"
        );
        Ok(receipt)
    }
}
