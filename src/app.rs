//! Root chat component with context providers and sync wiring.
//!
//! ARCHITECTURE
//! ============
//! `ChatRoot` owns every piece of per-view state. In the browser it starts the
//! polling loop and the push client, builds the send and typing callbacks,
//! and tears all of it down in `on_cleanup`. Without the `csr` feature it
//! renders the initial batch with inert callbacks.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use leptos::prelude::*;

use crate::components::chat_panel::ChatPanel;
use crate::components::notification_stack::NotificationStack;
use crate::net::types::Message;
use crate::state::chat::ChatState;
use crate::state::notifications::NotificationState;
use crate::state::session::ChatSession;

/// Root chat component.
///
/// `initial` is the batch embedded in the page, if any. Without it the view
/// fetches the list once on mount.
#[component]
pub fn ChatRoot(session: ChatSession, initial: Option<Vec<Message>>) -> impl IntoView {
    let chat = RwSignal::new(ChatState::new(session.viewer_id));
    let notifications = RwSignal::new(NotificationState::default());
    let typing_label = RwSignal::new(None::<String>);
    let draft = RwSignal::new(String::new());
    let sending = RwSignal::new(false);

    provide_context(chat);
    provide_context(notifications);
    provide_context(session.clone());

    let fetch_initial = initial.is_none();
    if let Some(messages) = initial {
        load_initial_batch(chat, messages, session.config.initial_stagger_ms);
    }

    #[cfg(feature = "csr")]
    let (on_send, on_typing) = start_sync(
        &session,
        SyncSignals { chat, notifications, typing_label, draft, sending },
        fetch_initial,
    );
    #[cfg(not(feature = "csr"))]
    let (on_send, on_typing) = {
        let _ = fetch_initial;
        (Callback::new(|()| {}), Callback::new(|()| {}))
    };

    view! {
        <ChatPanel
            draft
            sending
            typing_label
            on_send
            on_typing
            appear_ms=session.config.appear_ms
        />
        <NotificationStack/>
    }
}

/// Render the page-load batch and stagger its entrance once.
///
/// When a polling snapshot already listed every id the batch renders
/// nothing, and the snapshot's rows are left unanimated.
fn load_initial_batch(chat: RwSignal<ChatState>, messages: Vec<Message>, stagger_ms: u32) {
    let _ = chat.try_update(|c| {
        if c.load_initial(messages) > 0 {
            c.apply_initial_animation(stagger_ms);
        }
    });
}

/// Composer update once a send settles.
#[cfg(any(test, feature = "csr"))]
#[derive(Debug, PartialEq, Eq)]
struct SendFollowUp {
    /// Empty the draft; only after the server accepted it.
    clear_draft: bool,
    /// Error notification to raise, if any.
    error_text: Option<String>,
}

#[cfg(any(test, feature = "csr"))]
fn send_follow_up(outcome: &crate::net::send::SendOutcome) -> SendFollowUp {
    use crate::net::send::SendOutcome;

    match outcome {
        SendOutcome::Sent { .. } => SendFollowUp { clear_draft: true, error_text: None },
        SendOutcome::Failed(e) => SendFollowUp { clear_draft: false, error_text: Some(send_failure_text(e)) },
        SendOutcome::Ignored => SendFollowUp { clear_draft: false, error_text: None },
    }
}

/// Notification text for a failed send.
#[cfg(any(test, feature = "csr"))]
fn send_failure_text(error: &crate::net::error::ChatError) -> String {
    if error.is_transport() {
        "Failed to send message. Check your connection and try again.".to_owned()
    } else {
        format!("Failed to send message: {error}")
    }
}

#[cfg(feature = "csr")]
#[derive(Clone, Copy)]
struct SyncSignals {
    chat: RwSignal<ChatState>,
    notifications: RwSignal<NotificationState>,
    typing_label: RwSignal<Option<String>>,
    draft: RwSignal<String>,
    sending: RwSignal<bool>,
}

/// Start polling and push, and build the send and typing callbacks.
#[cfg(feature = "csr")]
fn start_sync(session: &ChatSession, signals: SyncSignals, fetch_initial: bool) -> (Callback<()>, Callback<()>) {
    use crate::components::notification_stack::notify;
    use crate::net::api::{ChatTransport, HttpTransport};
    use crate::net::polling::spawn_polling;
    use crate::net::push_client::spawn_push_client;
    use crate::net::send::send;
    use crate::state::notifications::NotificationKind;
    use crate::util::schedule::BrowserScheduler;
    use crate::util::throttle::Throttle;

    let SyncSignals { chat, notifications, typing_label, draft, sending } = signals;
    let transport = HttpTransport::from_session(session);
    let chat_id = session.chat_id;
    let config = session.config.clone();

    if fetch_initial {
        let transport = transport.clone();
        let stagger_ms = config.initial_stagger_ms;
        leptos::task::spawn_local(async move {
            match transport.fetch_messages(chat_id).await {
                Ok(messages) => load_initial_batch(chat, messages, stagger_ms),
                Err(e) => leptos::logging::warn!("chat {chat_id}: initial fetch failed: {e}"),
            }
        });
    }

    let polling = spawn_polling(transport.clone(), chat, chat_id, config.poll_interval_ms);
    let push = spawn_push_client(session, chat, move |label| {
        let _ = typing_label.try_set(label);
    });

    let throttle = StoredValue::new_local(Throttle::new(BrowserScheduler, config.typing_throttle_ms, {
        let push = push.clone();
        move || push.announce_typing()
    }));

    let notification_ms = config.notification_ms;
    let on_send = Callback::new(move |()| {
        if sending.get_untracked() {
            return;
        }
        let content = draft.get_untracked();
        let transport = transport.clone();
        sending.set(true);
        leptos::task::spawn_local(async move {
            let follow_up = send_follow_up(&send(&transport, &chat, chat_id, &content).await);
            if follow_up.clear_draft {
                let _ = draft.try_set(String::new());
            }
            if let Some(text) = follow_up.error_text {
                notify(notifications, NotificationKind::Error, text, notification_ms);
            }
            let _ = sending.try_set(false);
        });
    });

    let on_typing = Callback::new(move |()| {
        let _ = throttle.try_with_value(Throttle::trigger);
    });

    let unload_push = push.clone();
    let unload = window_event_listener(leptos::ev::beforeunload, move |_| unload_push.announce_leave());

    on_cleanup(move || {
        polling.stop();
        push.shutdown();
        let _ = throttle.try_with_value(Throttle::cancel);
        unload.remove();
    });

    (on_send, on_typing)
}
