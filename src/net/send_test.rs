use std::cell::RefCell;

use futures::executor::block_on;

use super::*;
use crate::net::api::FakeTransport;
use crate::net::types::{Message, MessageId};
use crate::state::chat::ChatState;

const CHAT: i64 = 12;
const VIEWER: i64 = 5;

fn msg(id: i64, sender: i64, content: &str) -> Message {
    Message {
        id: Some(MessageId::Int(id)),
        chat_id: Some(CHAT),
        sender_id: Some(sender),
        content: content.to_owned(),
        timestamp: "now".to_owned(),
    }
}

fn store() -> RefCell<ChatState> {
    RefCell::new(ChatState::new(Some(VIEWER)))
}

// =============================================================
// Input handling
// =============================================================

#[test]
fn blank_input_sends_nothing() {
    let transport = FakeTransport::default();
    let store = store();
    for input in ["", "   ", "\n\t "] {
        assert_eq!(block_on(send(&transport, &store, CHAT, input)), SendOutcome::Ignored);
    }
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn content_is_trimmed() {
    assert_eq!(
        prepare_send(CHAT, "  hello there \n"),
        Some(SendMessageRequest { chat_id: CHAT, content: "hello there".to_owned() })
    );
}

#[test]
fn inner_newlines_are_kept() {
    let request = prepare_send(CHAT, "line one\nline two").expect("request");
    assert_eq!(request.content, "line one\nline two");
}

// =============================================================
// Success
// =============================================================

#[test]
fn response_messages_merge_in_order() {
    let transport = FakeTransport::default();
    transport.queue_send(Ok(vec![msg(1, VIEWER, "hi"), msg(2, 99, "auto reply")]));
    let store = store();

    let outcome = block_on(send(&transport, &store, CHAT, " hi "));

    assert_eq!(outcome, SendOutcome::Sent { rendered: 2 });
    assert_eq!(transport.sent.borrow()[0].content, "hi");
    let state = store.borrow();
    let contents = state.messages.iter().map(|n| n.content.as_str()).collect::<Vec<_>>();
    assert_eq!(contents, vec!["hi", "auto reply"]);
    assert!(state.messages[0].own);
    assert!(!state.messages[1].own);
}

#[test]
fn copy_already_pushed_is_not_duplicated() {
    let transport = FakeTransport::default();
    transport.queue_send(Ok(vec![msg(1, VIEWER, "hi")]));
    let store = store();
    store.borrow_mut().merge(&msg(1, VIEWER, "hi"), MergeSource::Push);

    let outcome = block_on(send(&transport, &store, CHAT, "hi"));

    assert_eq!(outcome, SendOutcome::Sent { rendered: 0 });
    assert_eq!(store.borrow().messages.len(), 1);
}

#[test]
fn success_requests_scroll() {
    let transport = FakeTransport::default();
    transport.queue_send(Ok(Vec::new()));
    let store = store();
    let before = store.borrow().scroll_generation();

    block_on(send(&transport, &store, CHAT, "hi"));

    assert!(store.borrow().scroll_generation() > before);
}

#[test]
fn identity_set_untouched_until_response() {
    let transport = FakeTransport::default();
    let store = store();
    // No scripted response: the fake fails the request.
    let outcome = block_on(send(&transport, &store, CHAT, "hi"));
    assert!(matches!(outcome, SendOutcome::Failed(_)));
    assert!(store.borrow().seen().is_empty());
}

// =============================================================
// Failure
// =============================================================

#[test]
fn rejection_leaves_state_untouched() {
    let transport = FakeTransport::default();
    transport.queue_send(Err(ChatError::Rejected("chat closed".to_owned())));
    let store = store();
    store.borrow_mut().load_initial(vec![msg(1, 99, "earlier")]);

    let outcome = block_on(send(&transport, &store, CHAT, "hi"));

    assert_eq!(outcome, SendOutcome::Failed(ChatError::Rejected("chat closed".to_owned())));
    assert_eq!(store.borrow().messages.len(), 1);
    assert_eq!(transport.sent.borrow().len(), 1, "no automatic retry");
}
