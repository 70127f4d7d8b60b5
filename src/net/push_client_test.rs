use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::net::types::MessageId;
use crate::state::chat::ChatState;
use crate::util::schedule::ManualScheduler;

type Labels = Rc<RefCell<Vec<Option<String>>>>;

fn typing_indicator() -> (ManualScheduler, TypingIndicator<ManualScheduler>, Labels) {
    let scheduler = ManualScheduler::default();
    let labels: Labels = Rc::new(RefCell::new(Vec::new()));
    let sink = labels.clone();
    let typing = TypingIndicator::new(scheduler.clone(), 2000, move |label| sink.borrow_mut().push(label));
    (scheduler, typing, labels)
}

fn message_frame(id: serde_json::Value, content: &str) -> String {
    serde_json::json!({
        "event": "message:new",
        "data": { "id": id, "chat_id": 1, "sender_id": 2, "content": content, "timestamp": "09:00" }
    })
    .to_string()
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn parses_message_new() {
    let event = parse_inbound_event(&message_frame(serde_json::json!(11), "hello")).expect("event");
    let InboundEvent::MessageNew(message) = event else {
        panic!("expected message:new");
    };
    assert_eq!(message.id, Some(MessageId::Int(11)));
    assert_eq!(message.content, "hello");
}

#[test]
fn parses_typing() {
    let frame = r#"{"event":"typing","data":{"username":"ada"}}"#;
    assert_eq!(
        parse_inbound_event(frame),
        Some(InboundEvent::Typing { username: "ada".to_owned() })
    );
}

#[test]
fn typing_without_username_is_ignored() {
    assert_eq!(parse_inbound_event(r#"{"event":"typing","data":{}}"#), None);
    assert_eq!(parse_inbound_event(r#"{"event":"typing","data":{"username":"  "}}"#), None);
}

#[test]
fn unknown_and_garbled_frames_are_ignored() {
    assert_eq!(parse_inbound_event(r#"{"event":"presence","data":{}}"#), None);
    assert_eq!(parse_inbound_event("not json"), None);
    assert_eq!(parse_inbound_event(r#"{"data":{}}"#), None);
    assert_eq!(parse_inbound_event(r#"{"event":"message:new","data":{"id":1}}"#), None);
}

#[test]
fn encodes_outbound_envelope() {
    let text = encode_outbound(&OutboundEvent::Leave { chat_id: 8 }).expect("encode");
    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value, serde_json::json!({ "event": "leave", "data": { "chat_id": 8 } }));
}

// =============================================================
// Dispatch
// =============================================================

#[test]
fn new_message_is_rendered_animated_and_scrolled() {
    let store = RefCell::new(ChatState::new(Some(5)));
    let (_scheduler, typing, _labels) = typing_indicator();
    let before = store.borrow().scroll_generation();

    let event = parse_inbound_event(&message_frame(serde_json::json!(1), "hi")).expect("event");
    let effect = apply_inbound_event(event, &store, &typing);

    assert_eq!(effect, InboundEffect::Message(MergeOutcome::Rendered));
    let state = store.borrow();
    assert_eq!(state.messages.len(), 1);
    assert!(state.messages[0].animate);
    assert!(state.scroll_generation() > before);
}

#[test]
fn known_message_is_dropped() {
    let store = RefCell::new(ChatState::new(Some(5)));
    let (_scheduler, typing, _labels) = typing_indicator();
    let frame = message_frame(serde_json::json!("m-1"), "hi");

    apply_inbound_event(parse_inbound_event(&frame).expect("event"), &store, &typing);
    let before = store.borrow().scroll_generation();
    let effect = apply_inbound_event(parse_inbound_event(&frame).expect("event"), &store, &typing);

    assert_eq!(effect, InboundEffect::Message(MergeOutcome::Duplicate));
    assert_eq!(store.borrow().messages.len(), 1);
    assert_eq!(store.borrow().scroll_generation(), before);
}

#[test]
fn message_without_id_is_malformed() {
    let store = RefCell::new(ChatState::new(Some(5)));
    let (_scheduler, typing, _labels) = typing_indicator();
    let event = parse_inbound_event(&message_frame(serde_json::Value::Null, "hi")).expect("event");

    let effect = apply_inbound_event(event, &store, &typing);

    assert_eq!(effect, InboundEffect::Message(MergeOutcome::Malformed));
    assert!(store.borrow().messages.is_empty());
}

#[test]
fn typing_event_drives_indicator() {
    let store = RefCell::new(ChatState::new(Some(5)));
    let (scheduler, typing, labels) = typing_indicator();

    let effect = apply_inbound_event(InboundEvent::Typing { username: "ada".to_owned() }, &store, &typing);
    assert_eq!(effect, InboundEffect::TypingShown);
    assert_eq!(typing.label().as_deref(), Some("ada is typing..."));

    scheduler.advance_to(2000.0);
    assert_eq!(*labels.borrow(), vec![Some("ada is typing...".to_owned()), None]);
    assert!(store.borrow().messages.is_empty());
}

// =============================================================
// Outbound typing
// =============================================================

#[test]
fn typing_announced_only_when_connected_with_username() {
    assert_eq!(
        typing_announcement(3, Some("ada"), ConnectionStatus::Connected),
        Some(OutboundEvent::Typing { chat_id: 3, username: "ada".to_owned() })
    );
    assert_eq!(typing_announcement(3, Some("ada"), ConnectionStatus::Connecting), None);
    assert_eq!(typing_announcement(3, Some("ada"), ConnectionStatus::Disconnected), None);
    assert_eq!(typing_announcement(3, None, ConnectionStatus::Connected), None);
    assert_eq!(typing_announcement(3, Some(" "), ConnectionStatus::Connected), None);
}

// =============================================================
// Reconnect and URL helpers
// =============================================================

#[test]
fn backoff_doubles_to_cap() {
    let mut delay = 1000;
    let mut seen = vec![delay];
    for _ in 0..5 {
        delay = next_backoff(delay, 10_000);
        seen.push(delay);
    }
    assert_eq!(seen, vec![1000, 2000, 4000, 8000, 10_000, 10_000]);
}

#[test]
fn socket_url_follows_page_scheme() {
    assert_eq!(socket_url("https://dev.example/chat/4", "dev.example", "/ws/chat"), "wss://dev.example/ws/chat");
    assert_eq!(socket_url("http://localhost:5000/chat/4", "localhost:5000", "/ws/chat"), "ws://localhost:5000/ws/chat");
}

#[test]
fn socket_url_adds_leading_slash() {
    assert_eq!(socket_url("http://a", "a", "live"), "ws://a/live");
}
