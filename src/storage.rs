//! Storage subsystem
//!
//! This module provides abstractions and implementations for persisting
//! transcript records.
//!
//! Components:
//! - `storage_trait`: the TranscriptStore trait defining a uniform API.
//! - `types`: shared data types used by storage backends.
//! - `memory_storage`: in-process map, the always-available final fallback.
//! - `file_storage`: filesystem-backed implementation, one JSON document per
//!   record.
//! - `database_storage`: ORM-based SQLite implementation using SeaORM.
//! - `db_entities`: SeaORM entity models for the database backend.
//! - `remote_storage`: REST client speaking the bearer-gated HTTP surface.
//! - `backend`: runtime backend selection with automatic fallback.

pub mod backend;
pub mod database_storage;
pub mod db_entities;
pub mod file_storage;
pub mod memory_storage;
pub mod remote_storage;
pub mod storage_trait;
pub mod types;

pub use backend::open_storage;
pub use storage_trait::TranscriptStore;
pub use types::{
    BackendKind, ExportBundle, StorageInfo, StoreStats, TranscriptRecord, TranscriptSummary,
};
