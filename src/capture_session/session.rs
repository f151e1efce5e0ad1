//! The session orchestrator.
//!
//! A `CaptureSession` ties together the interception taps, the manual-fetch
//! fallback and the hand-off bridge for one extraction attempt. Both
//! candidate paths race once the session is armed; whichever produces a
//! valid payload first wins, and everything later is ignored. All state is
//! touched from the session's own task turns, so re-entrancy guards stand in
//! for locks.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::track::TrackLocator;
use super::{transition, CaptureRecord, SessionEvent, SessionState};
use crate::error_handling::types::SessionError;
use crate::handoff::channel::HandoffChannel;
use crate::handoff::types::TransferOutcome;
use crate::interception::interceptor::{install, ExecutionContext};
use crate::interception::types::{CandidateResponse, FetchRequest};
use crate::interception::url_filter::UrlFilter;
use crate::normalizer::types::is_caption_payload;

/// Bodies at or below this length are treated as truncated or placeholder
/// responses from a stale locator, not as captures. Heuristic, not
/// contractual.
pub const MIN_PLAUSIBLE_BODY_LEN: usize = 100;

const CANDIDATE_QUEUE_DEPTH: usize = 16;

pub struct CaptureSession {
    /// Correlates this session's log lines.
    id: Uuid,
    state: SessionState,
    record: Option<CaptureRecord>,
    context: Arc<ExecutionContext>,
    bridge: Arc<dyn HandoffChannel>,
    candidate_tx: mpsc::Sender<CandidateResponse>,
    candidate_rx: mpsc::Receiver<CandidateResponse>,
}

impl CaptureSession {
    pub fn new(context: Arc<ExecutionContext>, bridge: Arc<dyn HandoffChannel>) -> Self {
        let (candidate_tx, candidate_rx) = mpsc::channel(CANDIDATE_QUEUE_DEPTH);
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            record: None,
            context,
            bridge,
            candidate_tx,
            candidate_rx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn record(&self) -> Option<&CaptureRecord> {
        self.record.as_ref()
    }

    /// Installs the interception taps and arms the session.
    ///
    /// Installation is idempotent, so arming an already-armed session only
    /// replays the (no-op) state transition.
    pub fn arm(&mut self, filter: UrlFilter) {
        install(&self.context, self.candidate_tx.clone(), filter);
        self.state = transition(self.state, SessionEvent::Arm);
        info!("[{}] session armed", self.id);
    }

    /// Consumes intercepted candidates until one wins or the taps go away.
    ///
    /// Returns the capture record, or `None` if the candidate channel closed
    /// without a valid payload (context teardown).
    pub async fn run_until_captured(&mut self) -> Option<CaptureRecord> {
        while self.state != SessionState::Captured {
            match self.candidate_rx.recv().await {
                Some(candidate) => {
                    debug!("[{}] candidate from {}", self.id, candidate.url);
                    self.offer_candidate(&candidate.raw_text).await;
                }
                None => {
                    debug!("[{}] candidate channel closed", self.id);
                    return None;
                }
            }
        }
        self.record.clone()
    }

    /// Offers one raw candidate to the state machine.
    ///
    /// The first candidate that passes the shape predicate wins the session;
    /// everything after `Captured` is deliberately ignored. Returns whether
    /// this candidate became the capture.
    pub async fn offer_candidate(&mut self, raw_text: &str) -> bool {
        match self.state {
            SessionState::Captured => {
                debug!("[{}] ignoring candidate after capture", self.id);
                return false;
            }
            SessionState::Idle => {
                debug!("[{}] ignoring candidate while idle", self.id);
                return false;
            }
            SessionState::Armed | SessionState::FetchFailed => {}
        }

        if !is_caption_payload(raw_text) {
            debug!("[{}] candidate failed the shape predicate", self.id);
            return false;
        }

        let record = match CaptureRecord::from_raw(raw_text) {
            Ok(record) => record,
            Err(e) => {
                debug!("[{}] candidate did not normalize: {}", self.id, e);
                return false;
            }
        };

        self.state = transition(self.state, SessionEvent::ValidCandidate);

        // Clipboard trouble is reported but never blocks the capture.
        match self.bridge.send(&record.raw_payload).await {
            TransferOutcome::Delivered => {
                info!("[{}] captured payload handed off", self.id);
            }
            outcome => {
                warn!(
                    "[{}] capture complete but hand-off not delivered: {:?}",
                    self.id, outcome
                );
            }
        }

        info!(
            "[{}] captured transcript: {} words, {} chars",
            self.id, record.word_count, record.char_count
        );
        self.record = Some(record);
        true
    }

    /// Manual-fetch fallback keyed by a user-chosen caption-track locator.
    ///
    /// Applies the same shape predicate as the live path, plus a
    /// plausibility guard against stale locators that answer 200 with an
    /// empty or truncated body. A failure moves the session to `FetchFailed`;
    /// the next call re-arms and retries.
    pub async fn manual_fetch(&mut self, track: &TrackLocator) -> Result<(), SessionError> {
        match self.state {
            SessionState::Captured => return Err(SessionError::AlreadyCaptured),
            SessionState::Idle => return Err(SessionError::NotArmed),
            SessionState::FetchFailed => {
                self.state = transition(self.state, SessionEvent::Rearm);
                info!("[{}] re-armed for manual fetch retry", self.id);
            }
            SessionState::Armed => {}
        }

        let mut response = match self.context.fetch(FetchRequest::get(&track.url)).await {
            Ok(response) => response,
            Err(e) => {
                self.state = transition(self.state, SessionEvent::ManualFetchFailed);
                return Err(SessionError::FetchFailed(e.to_string()));
            }
        };

        let text = match response.body_text() {
            Ok(text) => text,
            Err(e) => {
                self.state = transition(self.state, SessionEvent::ManualFetchFailed);
                return Err(SessionError::FetchFailed(e.to_string()));
            }
        };

        if text.trim().len() <= MIN_PLAUSIBLE_BODY_LEN {
            self.state = transition(self.state, SessionEvent::ManualFetchFailed);
            return Err(SessionError::ImplausibleBody(text.len()));
        }

        if !self.offer_candidate(&text).await {
            self.state = transition(self.state, SessionEvent::ManualFetchFailed);
            return Err(SessionError::FetchFailed(
                "response is not a caption payload".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::error_handling::types::TransportError;
    use crate::handoff::channel::MemoryChannel;
    use crate::interception::transport::{FetchTransport, XhrTransport};
    use crate::interception::types::{FetchResponse, XhrCompletion, XhrRequest};

    const CAPTION_URL: &str = "https://video.example/api/timedtext?v=abc123&lang=en";

    fn long_caption_body() -> String {
        // Comfortably above the plausibility threshold
        format!(
            r#"{{"events":[{{"tStartMs":0,"segs":[{{"utf8":"{}"}}]}}]}}"#,
            "a caption line that keeps going and going and going and going and going"
        )
    }

    struct ScriptedFetch {
        responses: Mutex<Vec<Result<(u16, String), TransportError>>>,
    }

    impl ScriptedFetch {
        fn new(responses: Vec<Result<(u16, String), TransportError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl FetchTransport for ScriptedFetch {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop()
                .expect("scripted fetch exhausted");
            next.map(|(status, body)| FetchResponse::new(status, request.url, body))
        }
    }

    struct NullXhr;

    #[async_trait]
    impl XhrTransport for NullXhr {
        async fn execute(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError> {
            Ok(XhrCompletion {
                status: 204,
                url: request.url,
                response_text: String::new(),
            })
        }
    }

    fn session_with(responses: Vec<Result<(u16, String), TransportError>>) -> CaptureSession {
        let context = Arc::new(ExecutionContext::new(
            Arc::new(ScriptedFetch::new(responses)),
            Arc::new(NullXhr),
        ));
        CaptureSession::new(context, Arc::new(MemoryChannel::new()))
    }

    #[tokio::test]
    async fn first_valid_candidate_wins() {
        let mut session = session_with(vec![]);
        session.arm(UrlFilter::default());

        assert!(session.offer_candidate(&long_caption_body()).await);
        assert_eq!(session.state(), SessionState::Captured);

        let second = r#"{"events":[{"segs":[{"utf8":"too late"}]}]}"#;
        assert!(!session.offer_candidate(second).await);
        assert!(!session.record().unwrap().clean_text.contains("too late"));
    }

    #[tokio::test]
    async fn candidates_are_ignored_while_idle() {
        let mut session = session_with(vec![]);
        assert!(!session.offer_candidate(&long_caption_body()).await);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn invalid_candidates_do_not_transition() {
        let mut session = session_with(vec![]);
        session.arm(UrlFilter::default());

        assert!(!session.offer_candidate("not json").await);
        assert!(!session.offer_candidate(r#"{"events":[]}"#).await);
        assert_eq!(session.state(), SessionState::Armed);
    }

    #[tokio::test]
    async fn capture_hands_off_raw_payload() {
        let bridge = Arc::new(MemoryChannel::new());
        let context = Arc::new(ExecutionContext::new(
            Arc::new(ScriptedFetch::new(vec![])),
            Arc::new(NullXhr),
        ));
        let mut session = CaptureSession::new(context, bridge.clone());
        session.arm(UrlFilter::default());

        let body = long_caption_body();
        assert!(session.offer_candidate(&body).await);
        assert_eq!(bridge.receive().await.unwrap().as_deref(), Some(body.as_str()));
    }

    #[tokio::test]
    async fn manual_fetch_success_captures() {
        let mut session = session_with(vec![Ok((200, long_caption_body()))]);
        session.arm(UrlFilter::default());

        let track = TrackLocator::new(CAPTION_URL);
        session.manual_fetch(&track).await.unwrap();
        assert_eq!(session.state(), SessionState::Captured);
        assert!(session.record().is_some());
    }

    #[tokio::test]
    async fn manual_fetch_network_error_enters_retry_loop() {
        let mut session = session_with(vec![
            Ok((200, long_caption_body())),
            Err(TransportError::ConnectionFailed("refused".into())),
        ]);
        session.arm(UrlFilter::default());

        let track = TrackLocator::new(CAPTION_URL);
        let err = session.manual_fetch(&track).await.unwrap_err();
        assert!(matches!(err, SessionError::FetchFailed(_)));
        assert_eq!(session.state(), SessionState::FetchFailed);

        // Retry re-arms and succeeds with the next scripted response
        session.manual_fetch(&track).await.unwrap();
        assert_eq!(session.state(), SessionState::Captured);
    }

    #[tokio::test]
    async fn stale_locator_short_body_is_a_failure() {
        let mut session = session_with(vec![Ok((200, r#"{"events":[]}"#.to_string()))]);
        session.arm(UrlFilter::default());

        let err = session
            .manual_fetch(&TrackLocator::new(CAPTION_URL))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ImplausibleBody(_)));
        assert_eq!(session.state(), SessionState::FetchFailed);
    }

    #[tokio::test]
    async fn manual_fetch_refused_after_capture() {
        let mut session = session_with(vec![]);
        session.arm(UrlFilter::default());
        session.offer_candidate(&long_caption_body()).await;

        let err = session
            .manual_fetch(&TrackLocator::new(CAPTION_URL))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyCaptured));
    }

    #[tokio::test]
    async fn intercepted_traffic_drives_the_session() {
        let context = Arc::new(ExecutionContext::new(
            Arc::new(ScriptedFetch::new(vec![Ok((200, long_caption_body()))])),
            Arc::new(NullXhr),
        ));
        let mut session = CaptureSession::new(context.clone(), Arc::new(MemoryChannel::new()));
        session.arm(UrlFilter::default());

        // Host traffic through the tapped primitive
        let mut response = context.fetch(FetchRequest::get(CAPTION_URL)).await.unwrap();
        assert!(response.body_text().is_ok());

        let record = session.run_until_captured().await.unwrap();
        assert!(record.word_count > 0);
        assert_eq!(session.state(), SessionState::Captured);
    }
}
