use chrono::{DateTime, Utc};

use crate::error_handling::types::TransportError;

/// A fetch-style outbound request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
        }
    }
}

/// A fetch-style response.
///
/// The body is a single-read stream: observers must clone the response
/// before reading, or the original caller would find it consumed.
#[derive(Debug)]
pub struct FetchResponse {
    pub status: u16,
    pub url: String,
    body: ResponseBody,
}

impl FetchResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: ResponseBody::new(body),
        }
    }

    /// Consumes the body, yielding its text. Fails on a second read.
    pub fn body_text(&mut self) -> Result<String, TransportError> {
        self.body.text()
    }

    /// Duplicates the response while the body is still unread.
    /// Returns `None` once the body has been consumed.
    pub fn try_clone(&self) -> Option<FetchResponse> {
        Some(FetchResponse {
            status: self.status,
            url: self.url.clone(),
            body: self.body.try_clone()?,
        })
    }
}

/// Single-read response body.
#[derive(Debug)]
pub struct ResponseBody {
    text: Option<String>,
}

impl ResponseBody {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn text(&mut self) -> Result<String, TransportError> {
        self.text.take().ok_or(TransportError::BodyConsumed)
    }

    pub fn try_clone(&self) -> Option<ResponseBody> {
        self.text.as_ref().map(|t| ResponseBody::new(t.clone()))
    }
}

/// An XHR-style outbound request.
#[derive(Debug, Clone)]
pub struct XhrRequest {
    pub url: String,
    pub method: String,
}

impl XhrRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
        }
    }
}

/// The completed state of an XHR-style request.
///
/// Unlike a fetch body, the transferred text is fully buffered at completion
/// and can be read any number of times.
#[derive(Debug, Clone)]
pub struct XhrCompletion {
    pub status: u16,
    pub url: String,
    pub response_text: String,
}

/// A caption-payload candidate observed by a tap, forwarded to the capture
/// session over the candidate channel.
#[derive(Debug, Clone)]
pub struct CandidateResponse {
    pub url: String,
    pub raw_text: String,
    pub received_at: DateTime<Utc>,
}

impl CandidateResponse {
    pub fn new(url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            raw_text: raw_text.into(),
            received_at: Utc::now(),
        }
    }
}
