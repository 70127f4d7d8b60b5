use std::cell::RefCell;

use futures::executor::block_on;

use super::*;
use crate::net::api::FakeTransport;
use crate::net::types::{Message, MessageId};
use crate::state::chat::MergeSource;

fn msg(id: i64) -> Message {
    Message {
        id: Some(MessageId::Int(id)),
        chat_id: Some(4),
        sender_id: Some(1),
        content: format!("message {id}"),
        timestamp: String::new(),
    }
}

/// Store that has been torn down.
struct GoneStore;

impl ChatStore for GoneStore {
    fn with_chat<R>(&self, _f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        None
    }
}

// =============================================================
// Tick outcomes
// =============================================================

#[test]
fn successful_tick_replaces_list() {
    let transport = FakeTransport::default();
    transport.queue_fetch(Ok(vec![msg(1), msg(2)]));
    let store = RefCell::new(ChatState::new(Some(1)));
    store.borrow_mut().merge(&msg(9), MergeSource::Push);

    let outcome = block_on(poll_once(&transport, &store, 4));

    assert_eq!(outcome, PollOutcome::Snapshot(SnapshotOutcome::Applied { rendered: 2, retained: 0 }));
    assert_eq!(*transport.fetched.borrow(), vec![4]);
    let state = store.borrow();
    assert_eq!(state.messages.len(), 2);
    assert!(!state.seen().has(&MessageId::Int(9)));
}

#[test]
fn failed_tick_leaves_state_untouched() {
    let transport = FakeTransport::default();
    transport.queue_fetch(Err(ChatError::Status(500)));
    let store = RefCell::new(ChatState::new(Some(1)));
    store.borrow_mut().load_initial(vec![msg(1)]);

    let outcome = block_on(poll_once(&transport, &store, 4));

    assert_eq!(outcome, PollOutcome::Failed(ChatError::Status(500)));
    let state = store.borrow();
    assert_eq!(state.messages.len(), 1);
    assert!(state.seen().has(&MessageId::Int(1)));
}

#[test]
fn next_tick_after_failure_recovers() {
    let transport = FakeTransport::default();
    transport.queue_fetch(Err(ChatError::Transport("offline".to_owned())));
    transport.queue_fetch(Ok(vec![msg(1)]));
    let store = RefCell::new(ChatState::new(Some(1)));

    assert!(matches!(block_on(poll_once(&transport, &store, 4)), PollOutcome::Failed(_)));
    assert!(matches!(block_on(poll_once(&transport, &store, 4)), PollOutcome::Snapshot(_)));
    assert_eq!(store.borrow().messages.len(), 1);
}

#[test]
fn torn_down_view_does_not_fetch() {
    let transport = FakeTransport::default();
    assert_eq!(block_on(poll_once(&transport, &GoneStore, 4)), PollOutcome::Detached);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn repeated_ticks_leave_set_equal_to_fetched_ids() {
    let transport = FakeTransport::default();
    transport.queue_fetch(Ok(vec![msg(1), msg(2), msg(3)]));
    transport.queue_fetch(Ok(vec![msg(2), msg(3)]));
    let store = RefCell::new(ChatState::new(Some(1)));

    block_on(poll_once(&transport, &store, 4));
    block_on(poll_once(&transport, &store, 4));

    let state = store.borrow();
    let mut seen = state.seen().iter().cloned().collect::<Vec<_>>();
    seen.sort_by_key(ToString::to_string);
    assert_eq!(seen, vec![MessageId::Int(2), MessageId::Int(3)]);
}
