//! Outgoing message pipeline.
//!
//! One trimmed message, one `POST`, no optimistic echo. Messages in the
//! server's response are merged through the identity set, so a copy that
//! already arrived over the push channel is not rendered twice.

#[cfg(test)]
#[path = "send_test.rs"]
mod send_test;

use super::api::ChatTransport;
use super::error::ChatError;
use super::types::SendMessageRequest;
use crate::state::chat::{ChatStore, MergeSource};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send after trimming; no request was made.
    Ignored,
    /// Accepted; `rendered` is how many returned messages were new.
    Sent { rendered: usize },
    Failed(ChatError),
}

/// Build the request for `content`, or `None` if it is blank.
pub fn prepare_send(chat_id: i64, content: &str) -> Option<SendMessageRequest> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some(SendMessageRequest { chat_id, content: content.to_owned() })
}

/// Send `content` to `chat_id` and merge the server's answer into `store`.
pub async fn send<T, S>(transport: &T, store: &S, chat_id: i64, content: &str) -> SendOutcome
where
    T: ChatTransport,
    S: ChatStore,
{
    let Some(request) = prepare_send(chat_id, content) else {
        return SendOutcome::Ignored;
    };

    let messages = match transport.send_message(&request).await {
        Ok(messages) => messages,
        Err(e) => {
            leptos::logging::warn!("chat {chat_id}: send failed: {e}");
            return SendOutcome::Failed(e);
        }
    };

    let rendered = store
        .with_chat(|chat| {
            let rendered = messages
                .iter()
                .filter(|message| chat.merge(message, MergeSource::SendResponse).is_rendered())
                .count();
            chat.request_scroll_to_end();
            rendered
        })
        .unwrap_or(0);

    SendOutcome::Sent { rendered }
}
