//! Companion-side auto-consumption protocol.
//!
//! When the companion context starts with the activation marker present in
//! its entry point, it attempts one clipboard read, validates the text as a
//! caption payload, and feeds it into the normalization pipeline. The marker
//! is stripped after the attempt, success or failure, so a context refresh
//! does not re-trigger consumption. A failed attempt is silent: missing
//! clipboard permission is an expected, common case, and the context simply
//! stays in its manual-input default state.

use log::{debug, info};

use super::channel::HandoffChannel;
use crate::capture_session::CaptureRecord;
use crate::normalizer::types::is_caption_payload;

/// Addressable entry point of the companion context, with query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    address: String,
}

impl EntryPoint {
    /// Query parameter signaling "attempt clipboard auto-consumption on load".
    pub const ACTIVATION_MARKER: &'static str = "auto=1";

    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn has_activation_marker(&self) -> bool {
        self.query_params()
            .any(|p| p == Self::ACTIVATION_MARKER)
    }

    /// Removes the activation marker from the visible address, in place and
    /// without a reload.
    pub fn strip_activation_marker(&mut self) {
        let Some((base, query)) = self.address.split_once('?') else {
            return;
        };
        let kept: Vec<&str> = query
            .split('&')
            .filter(|p| !p.is_empty() && *p != Self::ACTIVATION_MARKER)
            .collect();
        self.address = if kept.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, kept.join("&"))
        };
    }

    fn query_params(&self) -> impl Iterator<Item = &str> {
        self.address
            .split_once('?')
            .map(|(_, q)| q)
            .unwrap_or("")
            .split('&')
    }
}

/// Attempts clipboard auto-consumption if the entry point carries the
/// activation marker.
///
/// Returns the capture record on success. On any failure (no marker, no
/// clipboard access, text that is not a caption payload) returns `None`
/// and leaves the context in its manual-input default. The marker is
/// stripped after every attempt.
pub async fn consume_on_activation(
    entry: &mut EntryPoint,
    channel: &dyn HandoffChannel,
) -> Option<CaptureRecord> {
    if !entry.has_activation_marker() {
        return None;
    }
    entry.strip_activation_marker();

    let text = match channel.receive().await {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!("auto-consumption: nothing on the channel");
            return None;
        }
        Err(e) => {
            debug!("auto-consumption: channel read failed: {}", e);
            return None;
        }
    };

    // Pre-check before parsing: payloads always start with a JSON container
    // character.
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        debug!("auto-consumption: channel text is not a JSON container");
        return None;
    }
    if !is_caption_payload(&text) {
        debug!("auto-consumption: channel text is not a caption payload");
        return None;
    }

    match CaptureRecord::from_raw(&text) {
        Ok(record) => {
            info!(
                "auto-consumed caption payload from channel ({} words)",
                record.word_count
            );
            Some(record)
        }
        Err(e) => {
            debug!("auto-consumption: normalization failed: {}", e);
            None
        }
    }
}
