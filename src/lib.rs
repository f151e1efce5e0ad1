pub mod capture_session;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod handoff;
pub mod interception;
pub mod normalizer;
pub mod storage;
pub mod web_interface;

pub use capture_session::{CaptureRecord, CaptureSession, SessionState};
pub use normalizer::{normalize, NormalizedTranscript};
pub use storage::{TranscriptRecord, TranscriptStore};
