//! # devconnect-chat
//!
//! Leptos + WASM chat panel for DevConnect chat pages.
//!
//! The server renders the chat page with a chat identifier, the viewer's
//! identity and an empty messages container. This crate mounts into that
//! container and keeps the rendered message list in sync from three sources:
//! the send pipeline's authoritative responses, the realtime push channel, and
//! a periodic full re-fetch that acts as the durable fallback.
//!
//! Browser-only code (HTTP, WebSocket, timers, DOM) is gated behind the `csr`
//! feature. Reconciliation, timing and parsing logic compiles everywhere.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod render;
pub mod state;
pub mod util;

/// Mount the chat panel into the page's messages container.
///
/// Does nothing when the page carries no chat identifier or no messages
/// container, so the script can be included on every page.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn mount_chat() {
    use leptos::prelude::*;

    use crate::app::ChatRoot;
    use crate::state::session::ChatSession;

    console_error_panic_hook::set_once();

    let raw = util::dom::read_page_context();
    let Some(session) = ChatSession::from_page(&raw) else {
        return;
    };

    let level = session
        .config
        .log_level
        .parse::<log::Level>()
        .unwrap_or(log::Level::Info);
    let _ = console_log::init_with_level(level);

    let Some(container) = util::dom::messages_container() else {
        return;
    };

    let initial = raw
        .initial_messages
        .as_deref()
        .and_then(|json| match net::api::parse_message_list_json(json) {
            Ok(messages) => Some(messages),
            Err(e) => {
                leptos::logging::warn!("ignoring embedded initial messages: {e}");
                None
            }
        });

    util::dom::clear_children(&container);
    leptos::logging::log!("mounting chat {}", session.chat_id);

    leptos::mount::mount_to(container, move || view! { <ChatRoot session initial/> }).forget();
}
