//! The pure normalization function.
//!
//! This is the one place where exact output bytes are contractual:
//! - every literal newline inside a segment becomes a single space,
//! - segments and events join by plain concatenation, no separator,
//! - word count = maximal whitespace-delimited non-empty tokens,
//! - char count = length of the produced string, counted in `char`s.
//!
//! No I/O, no state across calls; identical input always yields identical
//! output.

use serde::{Deserialize, Serialize};

use super::types::CaptionPayload;
use crate::error_handling::types::NormalizeError;

/// Result of one successful normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTranscript {
    pub clean_text: String,
    pub word_count: usize,
    pub char_count: usize,
}

/// Normalizes a raw caption payload into clean text plus counts.
///
/// Fails only when `raw_json` is not parseable JSON. A payload with zero
/// events or segments is valid and yields an empty transcript.
pub fn normalize(raw_json: &str) -> Result<NormalizedTranscript, NormalizeError> {
    let payload = CaptionPayload::from_raw(raw_json)?;

    let mut clean_text = String::new();
    for event in &payload.events {
        let Some(segs) = &event.segs else { continue };
        for seg in segs {
            let Some(text) = &seg.utf8 else { continue };
            clean_text.push_str(&text.replace('\n', " "));
        }
    }

    Ok(NormalizedTranscript {
        word_count: word_count(&clean_text),
        char_count: char_count(&clean_text),
        clean_text,
    })
}

/// Count of maximal whitespace-delimited non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length of the string as produced, in `char`s.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_over_repeated_calls() {
        let input = r#"[{"events":[{"segs":[{"utf8":"same in, "}]},{"segs":[{"utf8":"same out"}]}]}]"#;
        let first = normalize(input).unwrap();
        let second = normalize(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wrapped_and_bare_shapes_are_equivalent() {
        let bare = normalize(r#"{"events":[{"segs":[{"utf8":"abc"}]}]}"#).unwrap();
        let wrapped = normalize(r#"[{"events":[{"segs":[{"utf8":"abc"}]}]}]"#).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn newlines_fold_to_single_spaces() {
        let out = normalize(
            r#"{"events":[{"segs":[{"utf8":"Line1\n"}]},{"segs":[{"utf8":"Line2"}]}]}"#,
        )
        .unwrap();
        assert_eq!(out.clean_text, "Line1 Line2");
    }

    #[test]
    fn join_is_plain_concatenation() {
        // Any spacing must come from the source text itself
        let out = normalize(
            r#"{"events":[{"segs":[{"utf8":"Hello "}]},{"segs":[{"utf8":"World"}]}]}"#,
        )
        .unwrap();
        assert_eq!(out.clean_text, "Hello World");
    }

    #[test]
    fn invalid_json_is_a_terminal_error() {
        let err = normalize("this is not valid json").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidJson(_)));
    }

    #[test]
    fn empty_events_is_valid_and_empty() {
        let out = normalize(r#"{"events":[]}"#).unwrap();
        assert_eq!(out.clean_text, "");
        assert_eq!(out.word_count, 0);
        assert_eq!(out.char_count, 0);
    }

    #[test]
    fn events_without_segs_contribute_nothing() {
        let out = normalize(r#"{"events":[{"tStartMs":0},{"segs":null},{"segs":[{"utf8":"x"}]}]}"#)
            .unwrap();
        assert_eq!(out.clean_text, "x");
    }

    #[test]
    fn segments_without_utf8_contribute_nothing() {
        let out = normalize(r#"{"events":[{"segs":[{"tOffsetMs":10},{"utf8":"y"}]}]}"#).unwrap();
        assert_eq!(out.clean_text, "y");
    }

    #[test]
    fn full_auto_caption_payload() {
        let input = r#"[{"events":[{"tStartMs":0,"segs":[{"utf8":"Hello and welcome to this video."}]},{"tStartMs":5000,"segs":[{"utf8":"Today we are going to talk about\n"}]},{"tStartMs":9000,"segs":[{"utf8":"something really interesting."}]}]}]"#;
        let out = normalize(input).unwrap();
        assert_eq!(
            out.clean_text,
            "Hello and welcome to this video.Today we are going to talk about something really interesting."
        );
        assert_eq!(out.word_count, 15);
        assert_eq!(out.char_count, 94);
    }

    #[test]
    fn bare_object_payload() {
        let out =
            normalize(r#"{"events":[{"segs":[{"utf8":"Test "}]},{"segs":[{"utf8":"data"}]}]}"#)
                .unwrap();
        assert_eq!(out.clean_text, "Test data");
        assert_eq!(out.word_count, 2);
    }

    #[test]
    fn unrelated_event_fields_are_tolerated() {
        let plain = normalize(r#"{"events":[{"segs":[{"utf8":"same"}]}]}"#).unwrap();
        let extra =
            normalize(r#"{"events":[{"wWinId":1,"aAppend":1,"segs":[{"utf8":"same"}]}]}"#).unwrap();
        assert_eq!(plain, extra);
    }

    #[test]
    fn multibyte_text_counts_chars_not_bytes() {
        let out = normalize(r#"{"events":[{"segs":[{"utf8":"héllo"}]}]}"#).unwrap();
        assert_eq!(out.char_count, 5);
        assert_eq!(out.word_count, 1);
    }
}
