use serde::{Deserialize, Serialize};

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query parameters of `GET /transcripts`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Query parameters of `GET /transcripts/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}
