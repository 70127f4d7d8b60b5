//! WebSocket push channel for realtime messages and typing notices.
//!
//! The push client joins the chat room on every (re)connect, merges
//! `message:new` events through the identity set and drives the typing
//! indicator. While the socket is down the view is polling-only; the loop
//! reconnects with exponential backoff and never surfaces the outage to the
//! user.
//!
//! All WebSocket logic is gated behind `#[cfg(feature = "csr")]` since it
//! requires a browser environment. Event parsing and dispatch are plain
//! functions so they are unit-tested on the host.
//!
//! ERROR HANDLING
//! ==============
//! Undecodable frames and unknown events are dropped. A `message:new` without
//! an id is logged and dropped. Socket failures only change
//! [`ConnectionStatus`] and schedule a reconnect.

#[cfg(test)]
#[path = "push_client_test.rs"]
mod push_client_test;

use super::types::{InboundEvent, Message, OutboundEvent};
use crate::state::chat::{ChatStore, ConnectionStatus, MergeOutcome, MergeSource};
use crate::state::typing::TypingIndicator;
use crate::util::schedule::Scheduler;

const EVENT_MESSAGE_NEW: &str = "message:new";
const EVENT_TYPING: &str = "typing";

/// What an inbound event did to the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundEffect {
    Message(MergeOutcome),
    TypingShown,
    Ignored,
}

/// Decode one text frame `{"event": .., "data": {..}}`.
///
/// Returns `None` for invalid JSON, unknown events, and payloads missing
/// their required fields.
pub fn parse_inbound_event(text: &str) -> Option<InboundEvent> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let event = value.get("event")?.as_str()?;
    let data = value.get("data")?;
    match event {
        EVENT_MESSAGE_NEW => serde_json::from_value::<Message>(data.clone())
            .ok()
            .map(InboundEvent::MessageNew),
        EVENT_TYPING => {
            let username = data.get("username")?.as_str()?.trim();
            if username.is_empty() {
                return None;
            }
            Some(InboundEvent::Typing { username: username.to_owned() })
        }
        _ => None,
    }
}

/// Encode an outbound event as a text frame.
///
/// # Errors
///
/// Propagates `serde_json` serialization failures.
pub fn encode_outbound(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Apply a decoded event to the chat state and the typing indicator.
pub fn apply_inbound_event<S, T>(event: InboundEvent, store: &S, typing: &TypingIndicator<T>) -> InboundEffect
where
    S: ChatStore,
    T: Scheduler + 'static,
{
    match event {
        InboundEvent::MessageNew(message) => {
            let Some(outcome) = store.with_chat(|chat| {
                let outcome = chat.merge(&message, MergeSource::Push);
                if outcome.is_rendered() {
                    chat.request_scroll_to_end();
                }
                outcome
            }) else {
                return InboundEffect::Ignored;
            };
            if outcome == MergeOutcome::Malformed {
                leptos::logging::warn!("push: dropping message without id");
            }
            InboundEffect::Message(outcome)
        }
        InboundEvent::Typing { username } => {
            if typing.show(&username) {
                InboundEffect::TypingShown
            } else {
                InboundEffect::Ignored
            }
        }
    }
}

/// The typing notice to emit for local input, if one may go out now.
pub fn typing_announcement(
    chat_id: i64,
    username: Option<&str>,
    connection: ConnectionStatus,
) -> Option<OutboundEvent> {
    if connection != ConnectionStatus::Connected {
        return None;
    }
    let username = username.map(str::trim).filter(|u| !u.is_empty())?;
    Some(OutboundEvent::Typing { chat_id, username: username.to_owned() })
}

/// Double the reconnect delay, capped at `max_ms`.
pub fn next_backoff(current_ms: u32, max_ms: u32) -> u32 {
    current_ms.saturating_mul(2).min(max_ms)
}

/// Build the socket URL for the page at `href` served from `host`.
pub fn socket_url(href: &str, host: &str, path: &str) -> String {
    let proto = if href.starts_with("https") { "wss" } else { "ws" };
    let path = if path.starts_with('/') { path.to_owned() } else { format!("/{path}") };
    format!("{proto}://{host}{path}")
}

/// Outbound side of a running push client.
///
/// Everything here is best-effort: if the socket is down the event is dropped
/// (typing) or queued for a socket that may never open (leave).
#[cfg(feature = "csr")]
#[derive(Clone)]
pub struct PushHandle {
    tx: futures::channel::mpsc::UnboundedSender<String>,
    chat_id: i64,
    username: Option<String>,
    chat: leptos::prelude::RwSignal<crate::state::chat::ChatState>,
    shutdown: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(feature = "csr")]
impl PushHandle {
    fn connection(&self) -> ConnectionStatus {
        use leptos::prelude::WithUntracked;
        self.chat
            .try_with_untracked(|chat| chat.connection)
            .unwrap_or_default()
    }

    fn send(&self, event: &OutboundEvent) {
        match encode_outbound(event) {
            Ok(text) => {
                let _ = self.tx.unbounded_send(text);
            }
            Err(e) => leptos::logging::warn!("push: failed to encode event: {e}"),
        }
    }

    /// Tell the room the viewer is typing.
    pub fn announce_typing(&self) {
        if let Some(event) = typing_announcement(self.chat_id, self.username.as_deref(), self.connection()) {
            self.send(&event);
        }
    }

    /// Leave the room if the socket is up.
    pub fn announce_leave(&self) {
        if self.connection() == ConnectionStatus::Connected {
            self.send(&OutboundEvent::Leave { chat_id: self.chat_id });
        }
    }

    /// Send `leave`, then close the channel and stop reconnecting.
    pub fn shutdown(&self) {
        use std::sync::atomic::Ordering;

        if self.shutdown.swap(true, Ordering::Relaxed) {
            return;
        }
        self.announce_leave();
        self.tx.close_channel();
    }
}

/// Spawn the push client for `session`.
///
/// `on_typing` receives the typing indicator label as it changes.
#[cfg(feature = "csr")]
pub fn spawn_push_client(
    session: &crate::state::session::ChatSession,
    chat: leptos::prelude::RwSignal<crate::state::chat::ChatState>,
    on_typing: impl Fn(Option<String>) + 'static,
) -> PushHandle {
    use futures::channel::mpsc;

    use crate::util::schedule::BrowserScheduler;

    let (tx, rx) = mpsc::unbounded::<String>();
    let shutdown = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let typing = TypingIndicator::new(BrowserScheduler, session.config.typing_hide_ms, on_typing);

    let location = web_sys::window().map(|w| w.location());
    let href = location.as_ref().and_then(|l| l.href().ok()).unwrap_or_default();
    let host = location
        .as_ref()
        .and_then(|l| l.host().ok())
        .unwrap_or_else(|| "localhost".to_owned());
    let url = socket_url(&href, &host, &session.config.socket_path);

    let handle = PushHandle {
        tx: tx.clone(),
        chat_id: session.chat_id,
        username: session.username.clone(),
        chat,
        shutdown: shutdown.clone(),
    };

    leptos::task::spawn_local(push_loop(PushLoop {
        url,
        chat_id: session.chat_id,
        initial_backoff_ms: session.config.reconnect_initial_ms,
        max_backoff_ms: session.config.reconnect_max_ms,
        chat,
        typing,
        tx,
        rx,
        shutdown,
    }));

    handle
}

#[cfg(feature = "csr")]
struct PushLoop {
    url: String,
    chat_id: i64,
    initial_backoff_ms: u32,
    max_backoff_ms: u32,
    chat: leptos::prelude::RwSignal<crate::state::chat::ChatState>,
    typing: TypingIndicator<crate::util::schedule::BrowserScheduler>,
    tx: futures::channel::mpsc::UnboundedSender<String>,
    rx: futures::channel::mpsc::UnboundedReceiver<String>,
    shutdown: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

/// Main connection loop with reconnect logic.
#[cfg(feature = "csr")]
async fn push_loop(state: PushLoop) {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::Ordering;

    let PushLoop { url, chat_id, initial_backoff_ms, max_backoff_ms, chat, typing, tx, rx, shutdown } = state;
    let rx = Rc::new(RefCell::new(rx));
    let mut backoff_ms = initial_backoff_ms;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        if chat.with_chat(|c| c.connection = ConnectionStatus::Connecting).is_none() {
            break;
        }

        match connect_and_run(&url, chat_id, chat, &typing, &tx, &rx).await {
            Ok(()) => {
                leptos::logging::log!("chat {chat_id}: push channel closed");
            }
            Err(e) => {
                leptos::logging::warn!("chat {chat_id}: {e}; polling only");
            }
        }

        if chat.with_chat(|c| c.connection = ConnectionStatus::Disconnected).is_none() {
            break;
        }
        typing.hide();
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(backoff_ms))).await;
        backoff_ms = next_backoff(backoff_ms, max_backoff_ms);
    }

    typing.hide();
}

/// Connect to the WebSocket and process events until disconnect.
#[cfg(feature = "csr")]
async fn connect_and_run(
    url: &str,
    chat_id: i64,
    chat: leptos::prelude::RwSignal<crate::state::chat::ChatState>,
    typing: &TypingIndicator<crate::util::schedule::BrowserScheduler>,
    tx: &futures::channel::mpsc::UnboundedSender<String>,
    rx: &std::rc::Rc<std::cell::RefCell<futures::channel::mpsc::UnboundedReceiver<String>>>,
) -> Result<(), super::error::ChatError> {
    use futures::StreamExt;
    use gloo_net::websocket::Message as WsMessage;
    use gloo_net::websocket::futures::WebSocket;

    use super::error::ChatError;

    let ws = WebSocket::open(url).map_err(|e| ChatError::Unavailable(e.to_string()))?;
    let (mut ws_write, mut ws_read) = ws.split();

    chat.with_chat(|c| c.connection = ConnectionStatus::Connected);

    // Join goes through the queue so it is the first frame on this socket.
    let join = encode_outbound(&OutboundEvent::Join { chat_id }).map_err(|e| ChatError::Decode(e.to_string()))?;
    tx.unbounded_send(join)
        .map_err(|e| ChatError::Unavailable(e.to_string()))?;

    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        use futures::SinkExt;
        while let Some(text) = rx_borrow.next().await {
            if ws_write.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => {
                    if let Some(event) = parse_inbound_event(&text) {
                        apply_inbound_event(event, &chat, typing);
                    }
                }
                Ok(WsMessage::Bytes(_)) => {}
                Err(e) => {
                    leptos::logging::warn!("chat {chat_id}: push recv error: {e}");
                    break;
                }
            }
        }
    };

    futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await;

    Ok(())
}
