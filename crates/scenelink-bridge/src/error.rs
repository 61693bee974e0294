//! Bridge error types.
//!
//! [`BridgeError`] covers transport problems only. A command the host ran and
//! rejected is not an error here; it comes back as a failed
//! [`CommandOutcome`](crate::wire::CommandOutcome).

use std::time::Duration;

/// Errors raised while talking to the host process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The host process is unreachable, or was last observed unreachable.
    #[error("host process is offline ({url})")]
    Offline { url: String },

    /// No reply arrived within the request timeout.
    #[error("command '{command}' timed out after {}ms", .after.as_millis())]
    Timeout { command: String, after: Duration },

    /// Any other HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The host replied with something that is not a command response.
    #[error("invalid host response: {0}")]
    Protocol(String),
}

impl BridgeError {
    /// Whether the failure means "nothing is listening" rather than
    /// "this particular command went wrong".
    pub fn is_offline(&self) -> bool {
        matches!(self, BridgeError::Offline { .. })
    }
}
