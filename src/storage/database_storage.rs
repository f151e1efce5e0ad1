use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema,
};

use super::db_entities;
use super::storage_trait::TranscriptStore;
use super::types::{
    BackendKind, ExportBundle, StorageInfo, StoreStats, TranscriptRecord, TranscriptSummary,
};
use crate::error_handling::types::StorageError;

/// SQLite store through SeaORM.
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Default database filename used under the storage directory.
    pub const DEFAULT_DB_FILE: &'static str = "transcap.sqlite3";

    /// Opens (creating if missing) the database at `path`.
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create database dir {}: {}", parent.display(), e);
                StorageError::ConnectionFailed
            })?;
        }
        let url = format!("sqlite://{}?mode=rwc", path_ref.display());
        let db = Database::connect(&url).await.map_err(|e| {
            error!("Failed to open database {}: {}", path_ref.display(), e);
            StorageError::ConnectionFailed
        })?;
        info!("DatabaseStorage connected at {}", path_ref.display());
        Ok(Self { db })
    }

    fn to_model(record: &TranscriptRecord) -> db_entities::ActiveModel {
        db_entities::ActiveModel {
            video_id: Set(record.video_id.clone()),
            title: Set(record.title.clone()),
            channel_name: Set(record.channel_name.clone()),
            captured_at: Set(record.captured_at.to_rfc3339()),
            language: Set(record.language.clone()),
            is_auto_generated: Set(record.is_auto_generated),
            summary: Set(record.summary.clone()),
            clean_text: Set(record.clean_text.clone()),
            word_count: Set(record.word_count as i64),
            char_count: Set(record.char_count as i64),
        }
    }

    fn from_model(model: db_entities::Model) -> Result<TranscriptRecord, StorageError> {
        let captured_at = DateTime::parse_from_rfc3339(&model.captured_at)
            .map_err(|e| {
                error!("Invalid captured_at for {}: {}", model.video_id, e);
                StorageError::ReadFailed
            })?
            .with_timezone(&Utc);
        Ok(TranscriptRecord {
            video_id: model.video_id,
            title: model.title,
            channel_name: model.channel_name,
            captured_at,
            language: model.language,
            is_auto_generated: model.is_auto_generated,
            summary: model.summary,
            clean_text: model.clean_text,
            word_count: model.word_count as usize,
            char_count: model.char_count as usize,
        })
    }

    async fn upsert(&self, record: &TranscriptRecord) -> Result<(), StorageError> {
        use db_entities::Column;

        db_entities::Entity::insert(Self::to_model(record))
            .on_conflict(
                OnConflict::column(Column::VideoId)
                    .update_columns([
                        Column::Title,
                        Column::ChannelName,
                        Column::CapturedAt,
                        Column::Language,
                        Column::IsAutoGenerated,
                        Column::Summary,
                        Column::CleanText,
                        Column::WordCount,
                        Column::CharCount,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("Upsert failed for {}: {}", record.video_id, e);
                StorageError::WriteFailed
            })?;
        Ok(())
    }
}

#[async_trait]
impl TranscriptStore for DatabaseStorage {
    async fn init(&self) -> Result<StorageInfo, StorageError> {
        let backend = self.db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(db_entities::Entity);
        stmt.if_not_exists();
        self.db.execute(backend.build(&stmt)).await.map_err(|e| {
            error!("Schema creation failed: {}", e);
            StorageError::ConnectionFailed
        })?;
        debug!("transcripts table ready");
        Ok(StorageInfo {
            backend: BackendKind::Database,
            ready: true,
            detail: None,
        })
    }

    async fn save(&self, record: &TranscriptRecord) -> Result<String, StorageError> {
        self.upsert(record).await?;
        Ok(record.video_id.clone())
    }

    async fn get(&self, video_id: &str) -> Result<Option<TranscriptRecord>, StorageError> {
        let model = db_entities::Entity::find_by_id(video_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Lookup failed for {}: {}", video_id, e);
                StorageError::ReadFailed
            })?;
        model.map(Self::from_model).transpose()
    }

    async fn get_all(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<TranscriptSummary>, StorageError> {
        let models = db_entities::Entity::find()
            .order_by_desc(db_entities::Column::CapturedAt)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Listing failed: {}", e);
                StorageError::ReadFailed
            })?;
        models
            .into_iter()
            .map(|m| Self::from_model(m).map(|r| r.summary_view()))
            .collect()
    }

    async fn delete(&self, video_id: &str) -> Result<String, StorageError> {
        let result = db_entities::Entity::delete_by_id(video_id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("Delete failed for {}: {}", video_id, e);
                StorageError::WriteFailed
            })?;
        if result.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(video_id.to_string())
    }

    async fn search(&self, query: &str) -> Result<Vec<TranscriptRecord>, StorageError> {
        use db_entities::Column;

        // SQLite LIKE is case-insensitive for ASCII, which covers the
        // case-insensitivity contract for the ids and titles we store.
        let models = db_entities::Entity::find()
            .filter(
                Condition::any()
                    .add(Column::Title.contains(query))
                    .add(Column::CleanText.contains(query))
                    .add(Column::ChannelName.contains(query)),
            )
            .order_by_desc(Column::CapturedAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Search failed: {}", e);
                StorageError::ReadFailed
            })?;
        models.into_iter().map(Self::from_model).collect()
    }

    async fn get_stats(&self) -> Result<StoreStats, StorageError> {
        let total_count = db_entities::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| {
                error!("Count failed: {}", e);
                StorageError::ReadFailed
            })?;

        let models = db_entities::Entity::find().all(&self.db).await.map_err(|e| {
            error!("Stats scan failed: {}", e);
            StorageError::ReadFailed
        })?;
        let records: Result<Vec<TranscriptRecord>, StorageError> =
            models.into_iter().map(Self::from_model).collect();
        let records = records?;

        Ok(StoreStats {
            total_count,
            total_words: records.iter().map(|r| r.word_count as u64).sum(),
            first_captured_at: records.iter().map(|r| r.captured_at).min(),
            last_captured_at: records.iter().map(|r| r.captured_at).max(),
        })
    }

    async fn export_all(&self) -> Result<ExportBundle, StorageError> {
        let models = db_entities::Entity::find()
            .order_by_desc(db_entities::Column::CapturedAt)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("Export scan failed: {}", e);
                StorageError::ReadFailed
            })?;
        let records: Result<Vec<TranscriptRecord>, StorageError> =
            models.into_iter().map(Self::from_model).collect();
        Ok(ExportBundle {
            records: records?,
            exported_at: Utc::now(),
        })
    }

    async fn import_all(&self, records: Vec<TranscriptRecord>) -> Result<usize, StorageError> {
        let mut imported = 0usize;
        for record in records {
            match self.upsert(&record).await {
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

    async fn open_store(dir: &TempDir) -> DatabaseStorage {
        let storage = DatabaseStorage::connect(dir.path().join("test.sqlite3"))
            .await
            .unwrap();
        storage.init().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_video() {
        let dir = TempDir::new().unwrap();
        let storage = open_store(&dir).await;

        storage.save(&record("vid1", "first")).await.unwrap();
        storage.save(&record("vid1", "second")).await.unwrap();

        assert_eq!(storage.get_stats().await.unwrap().total_count, 1);
        assert_eq!(
            storage.get("vid1").await.unwrap().unwrap().clean_text,
            "second"
        );
    }

    #[tokio::test]
    async fn get_unknown_is_none_and_delete_unknown_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = open_store(&dir).await;

        assert!(storage.get("missing").await.unwrap().is_none());
        assert!(matches!(
            storage.delete("missing").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn search_matches_title_text_and_channel() {
        let dir = TempDir::new().unwrap();
        let storage = open_store(&dir).await;

        storage
            .save(&record("vid1", "the borrow checker explained"))
            .await
            .unwrap();
        storage.save(&record("vid2", "gardening tips")).await.unwrap();

        assert_eq!(storage.search("borrow").await.unwrap().len(), 1);
        assert_eq!(storage.search("A channel").await.unwrap().len(), 2);
        assert!(storage.search("nonexistent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_reflects_saved_records() {
        let dir = TempDir::new().unwrap();
        let storage = open_store(&dir).await;

        storage.save(&record("vid1", "one")).await.unwrap();
        storage.save(&record("vid2", "two")).await.unwrap();

        let bundle = storage.export_all().await.unwrap();
        assert_eq!(bundle.records.len(), 2);
        let imported = storage.import_all(bundle.records).await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(storage.get_stats().await.unwrap().total_count, 2);
    }
}
