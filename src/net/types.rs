//! Wire types shared by the HTTP endpoints and the push channel.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server serializes message ids as integers, but ids are treated as
//! opaque: `MessageId` accepts strings too so both delivery paths agree on
//! identity whatever the backend emits.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// Opaque message identifier, stable across polling, push and send responses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MessageId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A single chat message as delivered by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Absent for echoes that were never persisted.
    #[serde(default)]
    pub id: Option<MessageId>,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub sender_id: Option<i64>,
    /// Untrusted plain text.
    pub content: String,
    /// Display-ready label formatted by the server.
    #[serde(default)]
    pub timestamp: String,
}

/// Body of `POST /send_message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub content: String,
}

/// Status value the send endpoint uses to report success.
pub const SEND_STATUS_SUCCESS: &str = "success";

/// Events this client emits on the push channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum OutboundEvent {
    Join { chat_id: i64 },
    Leave { chat_id: i64 },
    Typing { chat_id: i64, username: String },
}

/// Events the push channel delivers to this client.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    /// `message:new` carrying one message.
    MessageNew(Message),
    /// `typing` carrying the author's display name.
    Typing { username: String },
}
