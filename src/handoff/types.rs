use serde::{Deserialize, Serialize};

/// Result of one sender-side transfer attempt.
///
/// Permission and platform problems are expected, common cases; they resolve
/// to an outcome the session can report without aborting the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    Delivered,
    PermissionDenied,
    Unavailable,
}

impl TransferOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, TransferOutcome::Delivered)
    }
}
