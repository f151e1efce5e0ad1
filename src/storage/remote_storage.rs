use async_trait::async_trait;
use log::{debug, error};
use serde::de::DeserializeOwned;

use super::storage_trait::TranscriptStore;
use super::types::{
    BackendKind, ExportBundle, ImportResponse, SavedResponse, StorageInfo, StoreStats,
    TranscriptRecord, TranscriptSummary,
};
use crate::error_handling::types::StorageError;

/// REST client for the bearer-gated HTTP surface; endpoint-for-endpoint
/// mirror of [`TranscriptStore`], so a remote server slots in behind the
/// same trait as the local backends.
pub struct RemoteStorage {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl RemoteStorage {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header("Authorization", format!("Bearer {}", self.token))
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StorageError> {
        let response = self.bearer(request).send().await.map_err(|e| {
            error!("Remote request failed: {}", e);
            StorageError::ConnectionFailed
        })?;
        match response.status().as_u16() {
            200..=299 => response.json::<T>().await.map_err(|e| {
                error!("Remote response body invalid: {}", e);
                StorageError::ReadFailed
            }),
            401 => Err(StorageError::Unauthorized),
            404 => Err(StorageError::NotFound),
            status => {
                debug!("remote returned status {}", status);
                Err(StorageError::ReadFailed)
            }
        }
    }
}

#[async_trait]
impl TranscriptStore for RemoteStorage {
    async fn init(&self) -> Result<StorageInfo, StorageError> {
        // The server reports its own backend; what matters locally is that
        // the handshake and the credential both worked.
        let _remote_info: StorageInfo = self
            .expect_json(self.client.post(self.url("/init")))
            .await?;
        Ok(StorageInfo {
            backend: BackendKind::Remote,
            ready: true,
            detail: Some(format!("remote at {}", self.base_url)),
        })
    }

    async fn save(&self, record: &TranscriptRecord) -> Result<String, StorageError> {
        let saved: SavedResponse = self
            .expect_json(self.client.post(self.url("/transcripts")).json(record))
            .await?;
        Ok(saved.video_id)
    }

    async fn get(&self, video_id: &str) -> Result<Option<TranscriptRecord>, StorageError> {
        let request = self
            .client
            .get(self.url(&format!("/transcripts/{}", video_id)));
        match self.expect_json::<TranscriptRecord>(request).await {
            Ok(record) => Ok(Some(record)),
            Err(StorageError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_all(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TranscriptSummary>, StorageError> {
        let request = self
            .client
            .get(self.url("/transcripts"))
            .query(&[("limit", limit), ("offset", offset)]);
        self.expect_json(request).await
    }

    async fn delete(&self, video_id: &str) -> Result<String, StorageError> {
        let request = self
            .client
            .delete(self.url(&format!("/transcripts/{}", video_id)));
        let deleted: SavedResponse = self.expect_json(request).await?;
        Ok(deleted.video_id)
    }

    async fn search(&self, query: &str) -> Result<Vec<TranscriptRecord>, StorageError> {
        let request = self
            .client
            .get(self.url("/transcripts/search"))
            .query(&[("q", query)]);
        self.expect_json(request).await
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        self.expect_json(self.client.get(self.url("/stats"))).await
    }

    async fn export_all(&self) -> Result<ExportBundle, StorageError> {
        self.expect_json(self.client.get(self.url("/export"))).await
    }

    async fn import_all(&self, records: Vec<TranscriptRecord>) -> Result<usize, StorageError> {
        let response: ImportResponse = self
            .expect_json(self.client.post(self.url("/import")).json(&records))
            .await?;
        Ok(response.imported_count)
    }
}
