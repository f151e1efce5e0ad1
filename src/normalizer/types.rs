use serde::Deserialize;
use serde_json::Value;

use crate::error_handling::types::NormalizeError;

/// A text fragment within a caption event.
///
/// `utf8` may embed literal newline characters; they are folded to single
/// spaces during normalization. Unknown sibling fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub utf8: Option<String>,
    #[serde(rename = "tOffsetMs", default)]
    pub offset_ms: Option<u64>,
}

/// One timed caption block as emitted by the caption endpoint.
///
/// `segs` may be absent or null; such an event contributes nothing and is
/// never an error. Extra keys (window ids and the like) are tolerated.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionEvent {
    #[serde(rename = "tStartMs", default)]
    pub start_ms: Option<u64>,
    #[serde(rename = "dDurationMs", default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub segs: Option<Vec<Segment>>,
}

/// Canonical internal shape of a caption payload.
///
/// The caption endpoint serves three interchangeable top-level variants:
/// a sequence of wrapper objects each holding `events`, a single wrapper
/// object holding `events` directly, or (forward-compat) any object exposing
/// `events`. A single classification pass at this boundary folds all of them
/// into one flat, ordered event list so nothing downstream branches on shape
/// again.
#[derive(Debug, Clone, Default)]
pub struct CaptionPayload {
    pub events: Vec<CaptionEvent>,
}

impl CaptionPayload {
    /// Parses `raw` as JSON and classifies it into the canonical shape.
    ///
    /// The only failure is unparseable JSON. A parseable value with no
    /// recognizable wrapper yields an empty payload, not an error.
    pub fn from_raw(raw: &str) -> Result<Self, NormalizeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| NormalizeError::InvalidJson(e.to_string()))?;
        Ok(Self::classify(value))
    }

    /// Folds any accepted top-level variant into the canonical event list.
    pub fn classify(value: Value) -> Self {
        let wrappers = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut events = Vec::new();
        for wrapper in wrappers {
            events.extend(wrapper_events(wrapper));
        }
        CaptionPayload { events }
    }

    /// Shape predicate: does this payload carry at least one caption event?
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Shape predicate over raw text: parses as JSON and yields a non-empty
/// `events` sequence under any accepted top-level variant.
pub fn is_caption_payload(raw: &str) -> bool {
    CaptionPayload::from_raw(raw)
        .map(|p| p.has_events())
        .unwrap_or(false)
}

fn wrapper_events(wrapper: Value) -> Vec<CaptionEvent> {
    match wrapper {
        Value::Object(mut map) => {
            if let Some(events) = map.remove("events") {
                match events {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|v| serde_json::from_value(v).ok())
                        .collect(),
                    // `events: null` and other non-sequence values contribute nothing
                    _ => Vec::new(),
                }
            } else if map.contains_key("segs") {
                // Wrapper lacks `events` but is itself shaped like a bare event
                serde_json::from_value(Value::Object(map))
                    .ok()
                    .into_iter()
                    .collect()
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}
