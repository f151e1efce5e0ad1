use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};

use super::storage_trait::TranscriptStore;
use super::types::{
    BackendKind, ExportBundle, StorageInfo, StoreStats, TranscriptRecord, TranscriptSummary,
};
use crate::error_handling::types::StorageError;

/// Filesystem-backed store: one JSON document per record under
/// `<base>/transcripts/`. Simple to inspect and to back up by hand.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        let transcripts_dir = base_path.join("transcripts");
        fs::create_dir_all(&transcripts_dir).map_err(|e| {
            error!(
                "Failed to create transcripts dir {}: {}",
                transcripts_dir.display(),
                e
            );
            StorageError::WriteFailed
        })?;
        info!("FileStorage initialized at {}", base_path.display());
        Ok(Self { base_path })
    }

    fn transcripts_dir(&self) -> PathBuf {
        self.base_path.join("transcripts")
    }

    /// Maps a video id to its on-disk filename. Ids are normally URL-safe
    /// already; anything else is flattened to '_' and stays inside the
    /// storage directory.
    fn record_path(&self, video_id: &str) -> PathBuf {
        let safe: String = video_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.transcripts_dir().join(format!("{}.json", safe))
    }

    fn write_record(&self, record: &TranscriptRecord) -> Result<(), StorageError> {
        let path = self.record_path(&record.video_id);
        let json = serde_json::to_string_pretty(record).map_err(|e| {
            error!("Failed to serialize record {}: {}", record.video_id, e);
            StorageError::WriteFailed
        })?;
        let mut f = File::create(&path).map_err(|e| {
            error!("Failed to create record file {}: {}", path.display(), e);
            StorageError::WriteFailed
        })?;
        f.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write record file {}: {}", path.display(), e);
            StorageError::WriteFailed
        })?;
        debug!("Saved record {} to {}", record.video_id, path.display());
        Ok(())
    }

    fn read_record_file(&self, path: &Path) -> Result<TranscriptRecord, StorageError> {
        let mut content = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut content))
            .map_err(|e| {
                error!("Failed to read record file {}: {}", path.display(), e);
                StorageError::ReadFailed
            })?;
        serde_json::from_str(&content).map_err(|e| {
            error!("Invalid record file {}: {}", path.display(), e);
            StorageError::ReadFailed
        })
    }

    fn load_all(&self) -> Result<Vec<TranscriptRecord>, StorageError> {
        let mut records = Vec::new();
        let dir = self.transcripts_dir();
        for entry in fs::read_dir(&dir).map_err(|e| {
            error!("Failed to read transcripts dir {}: {}", dir.display(), e);
            StorageError::ReadFailed
        })? {
            let entry = entry.map_err(|e| {
                error!("Dir entry error: {}", e);
                StorageError::ReadFailed
            })?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Ok(record) = self.read_record_file(&path) {
                    records.push(record);
                }
            }
        }
        records.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(records)
    }
}

#[async_trait]
impl TranscriptStore for FileStorage {
    async fn init(&self) -> Result<StorageInfo, StorageError> {
        // Directory creation happened in the constructor; report readiness.
        Ok(StorageInfo {
            backend: BackendKind::File,
            ready: true,
            detail: Some(format!("base path {}", self.base_path.display())),
        })
    }

    async fn save(&self, record: &TranscriptRecord) -> Result<String, StorageError> {
        self.write_record(record)?;
        Ok(record.video_id.clone())
    }

    async fn get(&self, video_id: &str) -> Result<Option<TranscriptRecord>, StorageError> {
        let path = self.record_path(video_id);
        if !path.exists() {
            return Ok(None);
        }
        let record = self.read_record_file(&path)?;
        // Distinct ids can flatten to the same filename; trust the document
        Ok((record.video_id == video_id).then_some(record))
    }

    async fn get_all(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TranscriptSummary>, StorageError> {
        Ok(self
            .load_all()?
            .iter()
            .skip(offset)
            .take(limit)
            .map(TranscriptRecord::summary_view)
            .collect())
    }

    async fn delete(&self, video_id: &str) -> Result<String, StorageError> {
        let path = self.record_path(video_id);
        if !path.exists() {
            return Err(StorageError::NotFound);
        }
        fs::remove_file(&path).map_err(|e| {
            error!("Failed to remove record file {}: {}", path.display(), e);
            StorageError::WriteFailed
        })?;
        info!("Deleted record {}", video_id);
        Ok(video_id.to_string())
    }

    async fn search(&self, query: &str) -> Result<Vec<TranscriptRecord>, StorageError> {
        let needle = query.to_lowercase();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.matches_query(&needle))
            .collect())
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        let all = self.load_all()?;
        Ok(StoreStats {
            total_count: all.len() as u64,
            total_words: all.iter().map(|r| r.word_count as u64).sum(),
            first_captured_at: all.iter().map(|r| r.captured_at).min(),
            last_captured_at: all.iter().map(|r| r.captured_at).max(),
        })
    }

    async fn export_all(&self) -> Result<ExportBundle, StorageError> {
        Ok(ExportBundle {
            records: self.load_all()?,
            exported_at: Utc::now(),
        })
    }

    async fn import_all(&self, records: Vec<TranscriptRecord>) -> Result<usize, StorageError> {
        let mut imported = 0usize;
        for record in records {
            match self.write_record(&record) {
                Ok(()) => imported += 1,
                Err(e) => debug!("skipping record {} on import: {}", record.video_id, e),
            }
        }
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_session::CaptureRecord;
    use tempfile::TempDir;

    fn record(video_id: &str, text: &str) -> TranscriptRecord {
        let raw = format!(r#"{{"events":[{{"segs":[{{"utf8":"{}"}}]}}]}}"#, text);
        let capture = CaptureRecord::from_raw(&raw).unwrap();
        TranscriptRecord::from_capture(video_id, "A title", "A channel", &capture)
    }

    #[tokio::test]
    async fn save_and_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let r = record("dQw4w9WgXcQ", "never gonna give");
        storage.save(&r).await.unwrap();

        let got = storage.get("dQw4w9WgXcQ").await.unwrap().unwrap();
        assert_eq!(got, r);
        assert!(storage.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.save(&record("vid1", "first")).await.unwrap();
        storage.save(&record("vid1", "second")).await.unwrap();

        assert_eq!(storage.get_stats().await.unwrap().total_count, 1);
        assert_eq!(
            storage.get("vid1").await.unwrap().unwrap().clean_text,
            "second"
        );
    }

    #[tokio::test]
    async fn hostile_id_cannot_escape_the_directory() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let r = record("../../etc/passwd", "nope");
        storage.save(&r).await.unwrap();

        // The flattened file stays inside the transcripts dir
        let dir_entries = fs::read_dir(dir.path().join("transcripts")).unwrap().count();
        assert_eq!(dir_entries, 1);
    }

    #[tokio::test]
    async fn delete_and_search() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        storage.save(&record("vid1", "rust is nice")).await.unwrap();
        storage.save(&record("vid2", "other topic")).await.unwrap();

        assert_eq!(storage.search("RUST").await.unwrap().len(), 1);

        storage.delete("vid1").await.unwrap();
        assert!(matches!(
            storage.delete("vid1").await,
            Err(StorageError::NotFound)
        ));
        assert_eq!(storage.get_stats().await.unwrap().total_count, 1);
    }
}
