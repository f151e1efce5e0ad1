use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture_session::CaptureRecord;

/// Persisted transcript, keyed by the unique `video_id`.
///
/// Saving a second record for the same video overwrites the content fields
/// and refreshes `captured_at`; it never creates a duplicate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub captured_at: DateTime<Utc>,
    pub language: Option<String>,
    pub is_auto_generated: bool,
    /// Reserved for future summarization support.
    pub summary: Option<String>,
    pub clean_text: String,
    pub word_count: usize,
    pub char_count: usize,
}

impl TranscriptRecord {
    /// Builds a record from one successful capture plus identity metadata.
    pub fn from_capture(
        video_id: impl Into<String>,
        title: impl Into<String>,
        channel_name: impl Into<String>,
        capture: &CaptureRecord,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel_name: channel_name.into(),
            captured_at: Utc::now(),
            language: None,
            is_auto_generated: true,
            summary: None,
            clean_text: capture.clean_text.clone(),
            word_count: capture.word_count,
            char_count: capture.char_count,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Projection with the listing fields only.
    pub fn summary_view(&self) -> TranscriptSummary {
        TranscriptSummary {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            channel_name: self.channel_name.clone(),
            captured_at: self.captured_at,
            language: self.language.clone(),
            is_auto_generated: self.is_auto_generated,
            word_count: self.word_count,
            char_count: self.char_count,
        }
    }

    /// Case-insensitive substring match over title, text and channel.
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.clean_text.to_lowercase().contains(needle_lower)
            || self.channel_name.to_lowercase().contains(needle_lower)
    }
}

/// Listing projection of a [`TranscriptRecord`]; carries no transcript body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub captured_at: DateTime<Utc>,
    pub language: Option<String>,
    pub is_auto_generated: bool,
    pub word_count: usize,
    pub char_count: usize,
}

/// The selectable storage backends, ordered here from most capable to most
/// compatible. `Memory` always initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Database,
    File,
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendKind::Remote => "remote",
            BackendKind::Database => "database",
            BackendKind::File => "file",
            BackendKind::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Result of backend initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInfo {
    pub backend: BackendKind,
    pub ready: bool,
    /// Human-readable note, e.g. which preferred backend was substituted.
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_count: u64,
    pub total_words: u64,
    pub first_captured_at: Option<DateTime<Utc>>,
    pub last_captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    pub records: Vec<TranscriptRecord>,
    pub exported_at: DateTime<Utc>,
}

/// Response bodies shared by the HTTP surface and the remote client, so the
/// two stay mirror images of each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResponse {
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported_count: usize,
}
