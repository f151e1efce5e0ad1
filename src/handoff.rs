//! Hand-off bridge between the extraction context and the companion context.
//!
//! The two contexts never share memory; a captured payload crosses over by
//! value through an asynchronous channel. The system clipboard is the
//! production channel; an in-process channel backs tests and same-process
//! wiring. Send failures are typed outcomes, never panics, so a capture
//! completes even when the transfer is denied.
//!
//! Components:
//! - `types`: transfer outcomes.
//! - `channel`: the [`channel::HandoffChannel`] trait and the in-process impl.
//! - `clipboard_channel`: system-clipboard implementation.
//! - `receiver`: the companion-side activation-marker consumption protocol.

pub mod channel;
pub mod clipboard_channel;
pub mod receiver;
pub mod types;

pub use channel::{HandoffChannel, MemoryChannel};
pub use clipboard_channel::ClipboardChannel;
pub use receiver::{consume_on_activation, EntryPoint};
pub use types::TransferOutcome;
