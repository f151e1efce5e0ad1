//! Decorator installation over an execution context's network primitives.
//!
//! Rather than mutating process-wide globals, the context owns its two
//! primitives and `install` swaps them for wrapping taps. A sentinel on the
//! context makes installation idempotent: a second `install` in the same
//! context is a no-op, so traffic is never double-observed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, trace};
use tokio::sync::mpsc::Sender;

use super::transport::{FetchTransport, XhrTransport};
use super::types::{CandidateResponse, FetchRequest, FetchResponse, XhrCompletion, XhrRequest};
use super::url_filter::UrlFilter;
use crate::error_handling::types::TransportError;
use crate::normalizer::types::is_caption_payload;

/// Holder of one context's network primitives.
///
/// The extraction context and the companion-app context each own one of
/// these; they never share memory. All requests made through the context go
/// through whatever primitives are currently installed, so swapping in taps
/// affects every caller uniformly.
pub struct ExecutionContext {
    fetch: Mutex<Arc<dyn FetchTransport>>,
    xhr: Mutex<Arc<dyn XhrTransport>>,
    intercepted: AtomicBool,
}

impl ExecutionContext {
    pub fn new(fetch: Arc<dyn FetchTransport>, xhr: Arc<dyn XhrTransport>) -> Self {
        Self {
            fetch: Mutex::new(fetch),
            xhr: Mutex::new(xhr),
            intercepted: AtomicBool::new(false),
        }
    }

    /// Current fetch-style primitive (tapped or not).
    pub fn fetch_transport(&self) -> Arc<dyn FetchTransport> {
        self.fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Current XHR-style primitive (tapped or not).
    pub fn xhr_transport(&self) -> Arc<dyn XhrTransport> {
        self.xhr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Issues a fetch-style request through the current primitive.
    pub async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        self.fetch_transport().fetch(request).await
    }

    /// Executes an XHR-style request through the current primitive.
    pub async fn xhr(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError> {
        self.xhr_transport().execute(request).await
    }

    pub fn is_intercepted(&self) -> bool {
        self.intercepted.load(Ordering::SeqCst)
    }

    fn swap_fetch(&self, transport: Arc<dyn FetchTransport>) {
        *self
            .fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = transport;
    }

    fn swap_xhr(&self, transport: Arc<dyn XhrTransport>) {
        *self
            .xhr
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = transport;
    }
}

/// Wraps both of the context's primitives with observing taps.
///
/// Matching responses that pass the caption shape predicate are forwarded on
/// `candidate_tx`. Installing twice is a no-op.
pub fn install(ctx: &ExecutionContext, candidate_tx: Sender<CandidateResponse>, filter: UrlFilter) {
    if ctx.intercepted.swap(true, Ordering::SeqCst) {
        debug!("interceptor already installed in this context, skipping");
        return;
    }

    let fetch_tap = FetchTap {
        inner: ctx.fetch_transport(),
        candidate_tx: candidate_tx.clone(),
        filter: filter.clone(),
    };
    ctx.swap_fetch(Arc::new(fetch_tap));

    let xhr_tap = XhrTap {
        inner: ctx.xhr_transport(),
        candidate_tx,
        filter,
    };
    ctx.swap_xhr(Arc::new(xhr_tap));

    debug!("interceptor installed over both network primitives");
}

/// Forwards `raw_text` as a candidate if it passes the shape predicate.
///
/// Uses `try_send` so a slow or full consumer can never delay the host
/// request path; a dropped candidate is logged and forgotten.
fn forward_candidate(tx: &Sender<CandidateResponse>, url: &str, raw_text: String) {
    if !is_caption_payload(&raw_text) {
        trace!("response from {} does not look like a caption payload", url);
        return;
    }
    match tx.try_send(CandidateResponse::new(url, raw_text)) {
        Ok(()) => debug!("forwarded caption candidate from {}", url),
        Err(e) => debug!("candidate channel refused a payload: {}", e),
    }
}

struct FetchTap {
    inner: Arc<dyn FetchTransport>,
    candidate_tx: Sender<CandidateResponse>,
    filter: UrlFilter,
}

#[async_trait]
impl FetchTransport for FetchTap {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let matched = self.filter.matches(&request.url);
        let response = self.inner.fetch(request).await?;

        if matched {
            // The body is single-read: observe a clone, return the original
            // untouched. A consumed or unreadable clone is not our caller's
            // problem.
            if let Some(mut copy) = response.try_clone() {
                match copy.body_text() {
                    Ok(text) => forward_candidate(&self.candidate_tx, &response.url, text),
                    Err(e) => debug!("could not read cloned body from {}: {}", response.url, e),
                }
            }
        }

        Ok(response)
    }
}

struct XhrTap {
    inner: Arc<dyn XhrTransport>,
    candidate_tx: Sender<CandidateResponse>,
    filter: UrlFilter,
}

#[async_trait]
impl XhrTransport for XhrTap {
    async fn execute(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError> {
        let matched = self.filter.matches(&request.url);
        let completion = self.inner.execute(request).await?;

        if matched {
            // Completed-transfer text is buffered; no cloning dance needed.
            forward_candidate(
                &self.candidate_tx,
                &completion.url,
                completion.response_text.clone(),
            );
        }

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const CAPTION_BODY: &str = r#"{"events":[{"segs":[{"utf8":"hello"}]}]}"#;
    const CAPTION_URL: &str = "https://video.example/api/timedtext?v=abc&lang=en";

    struct StaticFetch {
        body: &'static str,
    }

    impl StaticFetch {
        fn new(body: &'static str) -> Self {
            Self { body }
        }
    }

    #[async_trait]
    impl FetchTransport for StaticFetch {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
            Ok(FetchResponse::new(200, request.url, self.body))
        }
    }

    struct StaticXhr {
        body: &'static str,
    }

    #[async_trait]
    impl XhrTransport for StaticXhr {
        async fn execute(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError> {
            Ok(XhrCompletion {
                status: 200,
                url: request.url,
                response_text: self.body.to_string(),
            })
        }
    }

    fn tapped_context(
        body: &'static str,
    ) -> (ExecutionContext, mpsc::Receiver<CandidateResponse>) {
        let ctx = ExecutionContext::new(
            Arc::new(StaticFetch::new(body)),
            Arc::new(StaticXhr { body }),
        );
        let (tx, rx) = mpsc::channel(16);
        install(&ctx, tx, UrlFilter::default());
        (ctx, rx)
    }

    #[tokio::test]
    async fn non_matching_traffic_is_untouched() {
        let (ctx, mut rx) = tapped_context(CAPTION_BODY);

        let mut response = ctx
            .fetch(FetchRequest::get("https://video.example/api/stats"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_text().unwrap(), CAPTION_BODY);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn matching_fetch_forwards_candidate_and_stays_readable() {
        let (ctx, mut rx) = tapped_context(CAPTION_BODY);

        let mut response = ctx.fetch(FetchRequest::get(CAPTION_URL)).await.unwrap();
        // The caller still reads the full body
        assert_eq!(response.body_text().unwrap(), CAPTION_BODY);

        let candidate = rx.try_recv().unwrap();
        assert_eq!(candidate.raw_text, CAPTION_BODY);
        assert!(candidate.url.contains("/api/timedtext"));
    }

    #[tokio::test]
    async fn matching_xhr_forwards_candidate() {
        let (ctx, mut rx) = tapped_context(CAPTION_BODY);

        let completion = ctx.xhr(XhrRequest::get(CAPTION_URL)).await.unwrap();
        assert_eq!(completion.response_text, CAPTION_BODY);
        assert_eq!(rx.try_recv().unwrap().raw_text, CAPTION_BODY);
    }

    #[tokio::test]
    async fn non_caption_body_is_not_forwarded() {
        let (ctx, mut rx) = tapped_context(r#"{"unrelated":true}"#);

        let mut response = ctx.fetch(FetchRequest::get(CAPTION_URL)).await.unwrap();
        assert_eq!(response.body_text().unwrap(), r#"{"unrelated":true}"#);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn double_install_keeps_a_single_tap_layer() {
        let (ctx, mut rx) = tapped_context(CAPTION_BODY);
        assert!(ctx.is_intercepted());

        // Second install must be a no-op
        let (tx2, mut rx2) = mpsc::channel(16);
        install(&ctx, tx2, UrlFilter::default());

        ctx.fetch(FetchRequest::get(CAPTION_URL)).await.unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "candidate must not be duplicated");
        assert!(rx2.try_recv().is_err(), "second channel must stay silent");
    }

    #[tokio::test]
    async fn transport_errors_pass_through_unaltered() {
        struct FailingFetch;

        #[async_trait]
        impl FetchTransport for FailingFetch {
            async fn fetch(&self, _r: FetchRequest) -> Result<FetchResponse, TransportError> {
                Err(TransportError::ConnectionFailed("refused".into()))
            }
        }

        let ctx = ExecutionContext::new(Arc::new(FailingFetch), Arc::new(StaticXhr { body: "" }));
        let (tx, mut rx) = mpsc::channel(16);
        install(&ctx, tx, UrlFilter::default());

        let err = ctx.fetch(FetchRequest::get(CAPTION_URL)).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed(_)));
        assert!(rx.try_recv().is_err());
    }
}
