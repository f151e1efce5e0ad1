//! SeaORM entity models used by the database storage backend.
//!
//! One table, `transcripts`, keyed by the video id. Timestamps are stored as
//! RFC3339 strings for portability.

use sea_orm::entity::prelude::*;

/// Transcripts table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transcripts")]
pub struct Model {
    /// Video identifier, primary key (no auto increment)
    #[sea_orm(primary_key, auto_increment = false)]
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    /// RFC3339 capture timestamp
    pub captured_at: String,
    pub language: Option<String>,
    pub is_auto_generated: bool,
    /// Reserved for future summarization support
    pub summary: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub clean_text: String,
    pub word_count: i64,
    pub char_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
