//! Error type shared by the chat network paths.
//!
//! ERROR HANDLING
//! ==============
//! None of these are fatal to the page. Polling logs and waits for the next
//! tick, the send path surfaces a notification, and the push channel degrades
//! to polling-only while it reconnects.

/// Failure of a chat request or of the push channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("push channel unavailable: {0}")]
    Unavailable(String),
}

impl ChatError {
    /// Whether the failure happened before the server produced a usable answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status(_) | Self::Unavailable(_))
    }
}
