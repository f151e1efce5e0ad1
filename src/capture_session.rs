//! Capture session core module.
//!
//! One session orchestrates one extraction attempt per page visit. The
//! lifecycle is an explicit state machine so transitions can be unit-tested
//! without simulating a network context.

use serde::{Deserialize, Serialize};

use crate::error_handling::types::NormalizeError;
use crate::normalizer::normalize;

/// Submodule for the session orchestrator.
pub mod session;
/// Submodule for caption-track locators used by the manual-fetch fallback.
pub mod track;

pub use session::CaptureSession;
pub use track::TrackLocator;

/// Lifecycle state of a capture session.
///
/// Variants:
/// - `Idle`: initial; no interceptors installed.
/// - `Armed`: interceptors installed and/or the manual-fetch control is
///   available; waiting for a candidate.
/// - `Captured`: terminal success; later candidates are ignored.
/// - `FetchFailed`: a manual fetch failed; the manual control re-arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Armed,
    Captured,
    FetchFailed,
}

/// Observable happenings that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Arm,
    ValidCandidate,
    ManualFetchFailed,
    Rearm,
}

/// Pure transition function. Unknown (state, event) pairs keep the state;
/// `Captured` is terminal for every event.
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    use SessionEvent::*;
    use SessionState::*;

    match (state, event) {
        (Captured, _) => Captured,
        (Idle, Arm) => Armed,
        (Armed, ValidCandidate) => Captured,
        // Interception stays live through the manual-retry loop, so a live
        // candidate also resolves a FetchFailed session.
        (FetchFailed, ValidCandidate) => Captured,
        (Armed, ManualFetchFailed) => FetchFailed,
        (FetchFailed, Rearm) => Armed,
        (current, _) => current,
    }
}

/// Result of one successful extraction.
///
/// Derived deterministically from `raw_payload`; read-only afterward.
/// Ownership passes by value between contexts, never by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub raw_payload: String,
    pub clean_text: String,
    pub word_count: usize,
    pub char_count: usize,
}

impl CaptureRecord {
    pub fn from_raw(raw: &str) -> Result<Self, NormalizeError> {
        let transcript = normalize(raw)?;
        Ok(Self {
            raw_payload: raw.to_string(),
            clean_text: transcript.clean_text,
            word_count: transcript.word_count,
            char_count: transcript.char_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SessionEvent::*;
    use super::SessionState::*;
    use super::*;

    #[test]
    fn happy_path_reaches_captured() {
        let state = transition(Idle, Arm);
        assert_eq!(state, Armed);
        assert_eq!(transition(state, ValidCandidate), Captured);
    }

    #[test]
    fn captured_is_terminal() {
        for event in [Arm, ValidCandidate, ManualFetchFailed, Rearm] {
            assert_eq!(transition(Captured, event), Captured);
        }
    }

    #[test]
    fn manual_retry_loop() {
        let state = transition(Armed, ManualFetchFailed);
        assert_eq!(state, FetchFailed);
        assert_eq!(transition(state, Rearm), Armed);
    }

    #[test]
    fn live_candidate_resolves_fetch_failed() {
        assert_eq!(transition(FetchFailed, ValidCandidate), Captured);
    }

    #[test]
    fn idle_ignores_candidates() {
        assert_eq!(transition(Idle, ValidCandidate), Idle);
    }

    #[test]
    fn record_derivation_is_deterministic() {
        let raw = r#"{"events":[{"segs":[{"utf8":"one two"}]}]}"#;
        let a = CaptureRecord::from_raw(raw).unwrap();
        let b = CaptureRecord::from_raw(raw).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.raw_payload, raw);
        assert_eq!(a.word_count, 2);
    }
}
