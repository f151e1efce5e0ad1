use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use super::types::TransferOutcome;
use crate::error_handling::types::HandoffError;

/// Abstract asynchronous transfer channel between two execution contexts.
///
/// Implementations carry payloads by value; the sender and receiver never
/// observe shared mutable state. Alternate media (a message broker, shared
/// memory) can be substituted without touching the capture session.
#[async_trait]
pub trait HandoffChannel: Send + Sync {
    /// Sender side. Never fails hard: permission or platform problems
    /// resolve to a [`TransferOutcome`].
    async fn send(&self, payload: &str) -> TransferOutcome;

    /// Receiver side. `Ok(None)` when nothing is available to consume.
    async fn receive(&self) -> Result<Option<String>, HandoffError>;
}

/// In-process channel holding at most one payload.
///
/// Used by tests and by single-process wiring where both contexts live in
/// the same binary. A new send replaces the previous payload; a receive
/// leaves the payload in place, mirroring how a clipboard behaves.
#[derive(Default)]
pub struct MemoryChannel {
    slot: Mutex<Option<String>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HandoffChannel for MemoryChannel {
    async fn send(&self, payload: &str) -> TransferOutcome {
        match self.slot.lock() {
            Ok(mut slot) => {
                *slot = Some(payload.to_string());
                TransferOutcome::Delivered
            }
            Err(e) => {
                debug!("memory channel slot poisoned: {}", e);
                TransferOutcome::Unavailable
            }
        }
    }

    async fn receive(&self) -> Result<Option<String>, HandoffError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|e| HandoffError::ReadFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_by_value() {
        tokio_test::block_on(async {
            let channel = MemoryChannel::new();
            assert_eq!(channel.send("payload").await, TransferOutcome::Delivered);
            assert_eq!(channel.receive().await.unwrap().as_deref(), Some("payload"));
            // Clipboard semantics: receive does not consume
            assert_eq!(channel.receive().await.unwrap().as_deref(), Some("payload"));
        });
    }

    #[test]
    fn later_send_replaces_earlier() {
        tokio_test::block_on(async {
            let channel = MemoryChannel::new();
            channel.send("first").await;
            channel.send("second").await;
            assert_eq!(channel.receive().await.unwrap().as_deref(), Some("second"));
        });
    }

    #[test]
    fn empty_channel_yields_none() {
        tokio_test::block_on(async {
            let channel = MemoryChannel::new();
            assert!(channel.receive().await.unwrap().is_none());
        });
    }
}
