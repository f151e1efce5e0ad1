//! One filter function per endpoint, mirroring the TranscriptStore 1:1.

use std::sync::Arc;

use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::auth::require_bearer;
use super::types::{ApiError, ListParams, SearchParams};
use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::TranscriptStore;
use crate::storage::types::{ImportResponse, SavedResponse, TranscriptRecord};

const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;
const DEFAULT_PAGE_SIZE: usize = 50;

fn error_reply(err: StorageError) -> warp::reply::Response {
    let (status, message) = match err {
        StorageError::NotFound => (StatusCode::NOT_FOUND, "Record not found".to_string()),
        StorageError::Unauthorized => (StatusCode::UNAUTHORIZED, err.to_string()),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    };
    reply::with_status(reply::json(&ApiError::new(message)), status).into_response()
}

/// POST /init
pub fn init_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("init")
        .and(warp::path::end())
        .and(warp::post())
        .and(require_bearer(token))
        .and_then(move || {
            let store = store.clone();
            async move {
                match store.init().await {
                    Ok(info) => Ok::<_, Rejection>(reply::json(&info).into_response()),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// POST /transcripts  (upsert)
pub fn save_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("transcripts")
        .and(warp::path::end())
        .and(warp::post())
        .and(require_bearer(token))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(move |record: TranscriptRecord| {
            let store = store.clone();
            async move {
                match store.save(&record).await {
                    Ok(video_id) => Ok::<_, Rejection>(
                        reply::json(&SavedResponse { video_id }).into_response(),
                    ),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// GET /transcripts?limit&offset
pub fn list_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("transcripts")
        .and(warp::path::end())
        .and(warp::get())
        .and(require_bearer(token))
        .and(warp::query::<ListParams>())
        .and_then(move |params: ListParams| {
            let store = store.clone();
            async move {
                let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
                let offset = params.offset.unwrap_or(0);
                match store.get_all(limit, offset).await {
                    Ok(list) => Ok::<_, Rejection>(reply::json(&list).into_response()),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// GET /transcripts/search?q=
///
/// Must be composed before the id route; "search" would otherwise match as
/// an id.
pub fn search_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("transcripts" / "search")
        .and(warp::get())
        .and(require_bearer(token))
        .and(warp::query::<SearchParams>())
        .and_then(move |params: SearchParams| {
            let store = store.clone();
            async move {
                match store.search(&params.q).await {
                    Ok(hits) => Ok::<_, Rejection>(reply::json(&hits).into_response()),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// GET /transcripts/:id
pub fn get_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("transcripts" / String)
        .and(warp::get())
        .and(require_bearer(token))
        .and_then(move |video_id: String| {
            let store = store.clone();
            async move {
                match store.get(&video_id).await {
                    Ok(Some(record)) => Ok::<_, Rejection>(reply::json(&record).into_response()),
                    Ok(None) => Ok(error_reply(StorageError::NotFound)),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// DELETE /transcripts/:id
pub fn delete_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("transcripts" / String)
        .and(warp::delete())
        .and(require_bearer(token))
        .and_then(move |video_id: String| {
            let store = store.clone();
            async move {
                match store.delete(&video_id).await {
                    Ok(video_id) => Ok::<_, Rejection>(
                        reply::json(&SavedResponse { video_id }).into_response(),
                    ),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// GET /stats
pub fn stats_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("stats")
        .and(warp::path::end())
        .and(warp::get())
        .and(require_bearer(token))
        .and_then(move || {
            let store = store.clone();
            async move {
                match store.get_stats().await {
                    Ok(stats) => Ok::<_, Rejection>(reply::json(&stats).into_response()),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// GET /export
pub fn export_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("export")
        .and(warp::path::end())
        .and(warp::get())
        .and(require_bearer(token))
        .and_then(move || {
            let store = store.clone();
            async move {
                match store.export_all().await {
                    Ok(bundle) => Ok::<_, Rejection>(reply::json(&bundle).into_response()),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}

/// POST /import
pub fn import_route(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("import")
        .and(warp::path::end())
        .and(warp::post())
        .and(require_bearer(token))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(move |records: Vec<TranscriptRecord>| {
            let store = store.clone();
            async move {
                match store.import_all(records).await {
                    Ok(imported_count) => Ok::<_, Rejection>(
                        reply::json(&ImportResponse { imported_count }).into_response(),
                    ),
                    Err(e) => Ok(error_reply(e)),
                }
            }
        })
}
