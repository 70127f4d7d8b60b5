//! Identifiers injected by the server-rendered page.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page carries the chat id, the viewer's id and display name, a CSRF
//! token and optional `data-*` tunables. `util::dom` lifts them into a
//! [`RawPageContext`] of plain strings; [`ChatSession::from_page`] validates
//! them once at mount. Nothing else reads the page.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashMap;

use crate::config::ChatConfig;

/// Unvalidated values read from the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPageContext {
    pub chat_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub csrf_token: Option<String>,
    pub has_messages_container: bool,
    /// `data-*` attributes of the messages container, keyed without the prefix.
    pub dataset: HashMap<String, String>,
    /// Raw JSON of the embedded initial batch.
    pub initial_messages: Option<String>,
}

/// Immutable per-view session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatSession {
    pub chat_id: i64,
    pub viewer_id: Option<i64>,
    pub username: Option<String>,
    pub csrf_token: Option<String>,
    pub config: ChatConfig,
}

impl ChatSession {
    /// Validate the page context.
    ///
    /// Returns `None` when the page is not a chat page: no messages container,
    /// or a chat id that is missing or not an integer.
    pub fn from_page(raw: &RawPageContext) -> Option<Self> {
        if !raw.has_messages_container {
            return None;
        }
        let chat_id = raw.chat_id.as_deref()?.trim().parse::<i64>().ok()?;
        Some(Self {
            chat_id,
            viewer_id: raw.user_id.as_deref().and_then(|v| v.trim().parse().ok()),
            username: non_blank(raw.username.as_deref()),
            csrf_token: non_blank(raw.csrf_token.as_deref()),
            config: ChatConfig::from_lookup(|key| raw.dataset.get(key).cloned()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}
