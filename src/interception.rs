//! # Interception Module
//!
//! This module provides transparent observation of caption traffic flowing
//! through an execution context's network primitives.
//!
//! The main component is [`interceptor::install`] which swaps the context's
//! two request primitives (a fetch-style function and an XHR-style object)
//! for wrapping decorators, classifies outbound requests by URL, and forwards
//! the raw body of matching caption responses to the capture session via
//! an async channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │ Host requests   │───▶│ FetchTap/XhrTap  │───▶│ CaptureSession  │
//! │ (fetch / xhr)   │    │                  │    │ (via mpsc)      │
//! └─────────────────┘    │ - URL Filter     │    └─────────────────┘
//!                        │ - Shape Predicate
//!                        │ - Body Tee
//!                        └──────────────────┘
//! ```
//!
//! Wrapped primitives stay observationally transparent: every call performs
//! the real network operation and returns the real result to the caller.
//! Observation failures are swallowed at the boundary, never propagated.

pub mod interceptor;
pub mod transport;
pub mod types;
pub mod url_filter;

pub use interceptor::{install, ExecutionContext};
pub use transport::{FetchTransport, ReqwestTransport, XhrTransport};
pub use types::{CandidateResponse, FetchRequest, FetchResponse, ResponseBody, XhrCompletion, XhrRequest};
pub use url_filter::UrlFilter;
