//! Runtime backend selection.
//!
//! The preferred backend is tried first; on failure the chain falls toward
//! the most-compatible option and ends at the in-process store, which cannot
//! fail. Only every backend refusing to initialize is a hard error.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use super::database_storage::DatabaseStorage;
use super::file_storage::FileStorage;
use super::memory_storage::MemoryStorage;
use super::remote_storage::RemoteStorage;
use super::storage_trait::TranscriptStore;
use super::types::{BackendKind, StorageInfo};
use crate::error_handling::types::StorageError;

/// Everything backend construction can need; the configuration layer fills
/// this in.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    pub preferred: BackendKind,
    pub storage_path: PathBuf,
    pub remote_base_url: Option<String>,
    pub api_token: Option<String>,
}

/// Opens the preferred backend, falling back down the chain when it cannot
/// initialize. The returned [`StorageInfo`] names the backend actually in
/// use and notes a substitution when one happened.
pub async fn open_storage(
    options: &StorageOptions,
) -> Result<(Arc<dyn TranscriptStore>, StorageInfo), StorageError> {
    let mut last_error = None;

    for kind in fallback_chain(options.preferred) {
        let store = match open_backend(kind, options).await {
            Ok(store) => store,
            Err(e) => {
                warn!("storage backend {} unavailable: {}", kind, e);
                last_error = Some(e);
                continue;
            }
        };
        match store.init().await {
            Ok(mut info) => {
                if kind != options.preferred {
                    info.detail = Some(format!(
                        "fell back from preferred backend {}",
                        options.preferred
                    ));
                }
                info!("storage backend in use: {}", kind);
                return Ok((store, info));
            }
            Err(e) => {
                warn!("storage backend {} failed to initialize: {}", kind, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| StorageError::BackendUnavailable("no backend configured".to_string())))
}

/// Preferred backend first, then the remaining local backends ordered by
/// compatibility. Remote is never a fallback target: without explicit
/// remote configuration it cannot work.
fn fallback_chain(preferred: BackendKind) -> Vec<BackendKind> {
    let mut chain = vec![preferred];
    for kind in [BackendKind::Database, BackendKind::File, BackendKind::Memory] {
        if !chain.contains(&kind) {
            chain.push(kind);
        }
    }
    chain
}

async fn open_backend(
    kind: BackendKind,
    options: &StorageOptions,
) -> Result<Arc<dyn TranscriptStore>, StorageError> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryStorage::new())),
        BackendKind::File => Ok(Arc::new(FileStorage::new(&options.storage_path)?)),
        BackendKind::Database => {
            let path = options.storage_path.join(DatabaseStorage::DEFAULT_DB_FILE);
            Ok(Arc::new(DatabaseStorage::connect(path).await?))
        }
        BackendKind::Remote => {
            let base_url = options.remote_base_url.as_ref().ok_or_else(|| {
                StorageError::BackendUnavailable("no remote base URL configured".to_string())
            })?;
            let token = options.api_token.as_ref().ok_or_else(|| {
                StorageError::BackendUnavailable("no API token configured".to_string())
            })?;
            Ok(Arc::new(RemoteStorage::new(base_url, token)))
        }
    }
}
