//! Transcript normalization subsystem.
//!
//! Folds a raw caption payload (one of several accepted JSON shapes) into a
//! single cleaned text string plus word/char counts.
//!
//! Components:
//! - `types`: wire-shape structs and the canonical [`types::CaptionPayload`]
//!   produced by the classification pass.
//! - `normalize`: the pure normalization function and counting helpers.

pub mod normalize;
pub mod types;

pub use normalize::{char_count, normalize, word_count, NormalizedTranscript};
pub use types::{CaptionEvent, CaptionPayload, Segment};
