//! System-clipboard transfer channel.
//!
//! Clipboard access is a blocking, permission-gated platform call, so every
//! operation runs on the blocking pool and opens a fresh handle (the handle
//! type is not `Sync`). Denied or unsupported platforms resolve to typed
//! outcomes; the capture itself never depends on the transfer succeeding.

use async_trait::async_trait;
use log::{debug, warn};

use super::channel::HandoffChannel;
use super::types::TransferOutcome;
use crate::error_handling::types::HandoffError;

#[derive(Default)]
pub struct ClipboardChannel;

impl ClipboardChannel {
    pub fn new() -> Self {
        Self
    }
}

fn classify_write_error(err: &arboard::Error) -> TransferOutcome {
    match err {
        arboard::Error::ClipboardNotSupported => TransferOutcome::Unavailable,
        _ => TransferOutcome::PermissionDenied,
    }
}

#[async_trait]
impl HandoffChannel for ClipboardChannel {
    async fn send(&self, payload: &str) -> TransferOutcome {
        let payload = payload.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut clipboard = match arboard::Clipboard::new() {
                Ok(c) => c,
                Err(e) => {
                    debug!("clipboard unavailable: {}", e);
                    return classify_write_error(&e);
                }
            };
            match clipboard.set_text(payload) {
                Ok(()) => TransferOutcome::Delivered,
                Err(e) => {
                    warn!("clipboard write refused: {}", e);
                    classify_write_error(&e)
                }
            }
        })
        .await;

        outcome.unwrap_or(TransferOutcome::Unavailable)
    }

    async fn receive(&self) -> Result<Option<String>, HandoffError> {
        let result = tokio::task::spawn_blocking(|| {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| HandoffError::ReadFailed(e.to_string()))?;
            match clipboard.get_text() {
                Ok(text) => Ok(Some(text)),
                Err(arboard::Error::ContentNotAvailable) => Ok(None),
                Err(e) => Err(HandoffError::ReadFailed(e.to_string())),
            }
        })
        .await;

        result.map_err(|e| HandoffError::ReadFailed(e.to_string()))?
    }
}
