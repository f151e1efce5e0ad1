use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;

use super::storage_trait::TranscriptStore;
use super::types::{
    BackendKind, ExportBundle, StorageInfo, StoreStats, TranscriptRecord, TranscriptSummary,
};
use crate::error_handling::types::StorageError;

/// In-process store. Holds everything in a map; always initializes, so it is
/// the final fallback in the backend chain.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, TranscriptRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_records(&self) -> Result<Vec<TranscriptRecord>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::ReadFailed)?;
        let mut all: Vec<TranscriptRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(all)
    }
}

#[async_trait]
impl TranscriptStore for MemoryStorage {
    async fn init(&self) -> Result<StorageInfo, StorageError> {
        Ok(StorageInfo {
            backend: BackendKind::Memory,
            ready: true,
            detail: None,
        })
    }

    async fn save(&self, record: &TranscriptRecord) -> Result<String, StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::WriteFailed)?;
        records.insert(record.video_id.clone(), record.clone());
        debug!("memory store now holds {} record(s)", records.len());
        Ok(record.video_id.clone())
    }

    async fn get(&self, video_id: &str) -> Result<Option<TranscriptRecord>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::ReadFailed)?;
        Ok(records.get(video_id).cloned())
    }

    async fn get_all(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TranscriptSummary>, StorageError> {
        Ok(self
            .sorted_records()?
            .iter()
            .skip(offset)
            .take(limit)
            .map(TranscriptRecord::summary_view)
            .collect())
    }

    async fn delete(&self, video_id: &str) -> Result<String, StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::WriteFailed)?;
        records
            .remove(video_id)
            .map(|r| r.video_id)
            .ok_or(StorageError::NotFound)
    }

    async fn search(&self, query: &str) -> Result<Vec<TranscriptRecord>, StorageError> {
        let needle = query.to_lowercase();
        Ok(self
            .sorted_records()?
            .into_iter()
            .filter(|r| r.matches_query(&needle))
            .collect())
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        let all = self.sorted_records()?;
        Ok(StoreStats {
            total_count: all.len() as u64,
            total_words: all.iter().map(|r| r.word_count as u64).sum(),
            first_captured_at: all.iter().map(|r| r.captured_at).min(),
            last_captured_at: all.iter().map(|r| r.captured_at).max(),
        })
    }

    async fn export_all(&self) -> Result<ExportBundle, StorageError> {
        Ok(ExportBundle {
            records: self.sorted_records()?,
            exported_at: Utc::now(),
        })
    }

    async fn import_all(&self, records: Vec<TranscriptRecord>) -> Result<usize, StorageError> {
        let mut imported = 0usize;
        for record in records {
            if self.save(&record).await.is_ok() {
                imported += 1;
            }
        }
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_session::CaptureRecord;

    fn record(video_id: &str, text: &str) -> TranscriptRecord {
        let raw = format!(
            r#"{{"events":[{{"segs":[{{"utf8":"{}"}}]}}]}}"#,
            text
        );
        let capture = CaptureRecord::from_raw(&raw).unwrap();
        TranscriptRecord::from_capture(video_id, format!("Title {}", video_id), "Channel", &capture)
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = MemoryStorage::new();
        store.save(&record("vid1", "first version")).await.unwrap();
        store.save(&record("vid1", "second version")).await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_count, 1);

        let got = store.get("vid1").await.unwrap().unwrap();
        assert_eq!(got.clean_text, "second version");
    }

    #[tokio::test]
    async fn listing_paginates_newest_first() {
        let store = MemoryStorage::new();
        for i in 0..5i64 {
            let mut r = record(&format!("vid{}", i), "text");
            r.captured_at = Utc::now() + chrono::Duration::seconds(i);
            store.save(&r).await.unwrap();
        }

        let page = store.get_all(2, 1).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].video_id, "vid3");
        assert_eq!(page[1].video_id, "vid2");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_all_fields() {
        let store = MemoryStorage::new();
        store.save(&record("vid1", "Rust ownership")).await.unwrap();
        store.save(&record("vid2", "unrelated")).await.unwrap();

        let hits = store.search("OWNERSHIP").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].video_id, "vid1");

        // channel matches too
        assert_eq!(store.search("channel").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let store = MemoryStorage::new();
        assert!(matches!(
            store.delete("missing").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn export_import_roundtrip() {
        let source = MemoryStorage::new();
        source.save(&record("vid1", "one")).await.unwrap();
        source.save(&record("vid2", "two")).await.unwrap();

        let bundle = source.export_all().await.unwrap();
        let target = MemoryStorage::new();
        let imported = target.import_all(bundle.records).await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(target.get_stats().await.unwrap().total_count, 2);
    }
}
