//! Periodic full re-fetch of the message list.
//!
//! SYSTEM CONTEXT
//! ==============
//! Polling is the durable fallback behind the push channel: whatever push
//! misses or duplicates, the next snapshot corrects. There is no backoff; a
//! failed tick is logged and the next tick is the retry.

#[cfg(test)]
#[path = "polling_test.rs"]
mod polling_test;

use super::api::ChatTransport;
use super::error::ChatError;
use crate::state::chat::{ChatState, ChatStore, SnapshotOutcome};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Snapshot(SnapshotOutcome),
    Failed(ChatError),
    /// The view was torn down while the fetch was in flight.
    Detached,
}

/// Run one polling tick: take a ticket, fetch, apply the snapshot.
pub async fn poll_once<T, S>(transport: &T, store: &S, chat_id: i64) -> PollOutcome
where
    T: ChatTransport,
    S: ChatStore,
{
    let Some(ticket) = store.with_chat(ChatState::begin_poll) else {
        return PollOutcome::Detached;
    };

    match transport.fetch_messages(chat_id).await {
        Ok(messages) => store
            .with_chat(|chat| chat.apply_snapshot(ticket, messages))
            .map_or(PollOutcome::Detached, PollOutcome::Snapshot),
        Err(e) => {
            leptos::logging::warn!("chat {chat_id}: poll failed: {e}");
            PollOutcome::Failed(e)
        }
    }
}

/// Stops the polling task spawned by [`spawn_polling`].
#[cfg(feature = "csr")]
#[derive(Clone, Debug)]
pub struct PollingHandle {
    alive: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(feature = "csr")]
impl PollingHandle {
    pub fn stop(&self) {
        self.alive.store(false, std::sync::atomic::Ordering::Relaxed);
    }
}

/// Start the polling loop for the mounted view.
#[cfg(feature = "csr")]
pub fn spawn_polling<T>(
    transport: T,
    chat: leptos::prelude::RwSignal<ChatState>,
    chat_id: i64,
    interval_ms: u32,
) -> PollingHandle
where
    T: ChatTransport + 'static,
{
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let alive = Arc::new(AtomicBool::new(true));
    let alive_task = alive.clone();

    leptos::task::spawn_local(async move {
        loop {
            gloo_timers::future::sleep(std::time::Duration::from_millis(u64::from(interval_ms))).await;
            if !alive_task.load(Ordering::Relaxed) {
                break;
            }
            if poll_once(&transport, &chat, chat_id).await == PollOutcome::Detached {
                break;
            }
        }
        leptos::logging::log!("chat {chat_id}: polling stopped");
    });

    PollingHandle { alive }
}
