//! TranscriptStore Trait
//!
//! This module defines the `TranscriptStore` trait, the uniform interface
//! every storage backend implements.
//!
//! Implementors are responsible for:
//! - Upserting and retrieving transcript records keyed by video id
//! - Listing summaries with pagination
//! - Case-insensitive search over title, text and channel
//! - Aggregate statistics and bulk export/import
//!
//! All methods return a `Result` to handle potential storage errors.

use async_trait::async_trait;

use super::types::{ExportBundle, StorageInfo, StoreStats, TranscriptRecord, TranscriptSummary};
use crate::error_handling::types::StorageError;

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Prepares the backend (schema, directories, remote handshake).
    async fn init(&self) -> Result<StorageInfo, StorageError>;

    /// Upserts a record by `video_id`; returns the id.
    async fn save(&self, record: &TranscriptRecord) -> Result<String, StorageError>;

    /// Retrieves one record, or `None` if the id is unknown.
    async fn get(&self, video_id: &str) -> Result<Option<TranscriptRecord>, StorageError>;

    /// Lists summaries, newest first.
    async fn get_all(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TranscriptSummary>, StorageError>;

    /// Deletes one record; `StorageError::NotFound` if the id is unknown.
    async fn delete(&self, video_id: &str) -> Result<String, StorageError>;

    /// Case-insensitive substring search over title, text and channel.
    async fn search(&self, query: &str) -> Result<Vec<TranscriptRecord>, StorageError>;

    async fn get_stats(&self) -> Result<StoreStats, StorageError>;

    async fn export_all(&self) -> Result<ExportBundle, StorageError>;

    /// Best-effort upsert of each record; returns how many were imported.
    async fn import_all(&self, records: Vec<TranscriptRecord>) -> Result<usize, StorageError>;
}
