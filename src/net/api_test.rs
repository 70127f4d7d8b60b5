use super::*;
use crate::net::types::MessageId;

#[test]
fn messages_endpoint_appends_chat_id() {
    assert_eq!(messages_endpoint("/get_messages", 12), "/get_messages/12");
    assert_eq!(messages_endpoint("/get_messages/", 12), "/get_messages/12");
}

// =============================================================
// parse_message_list
// =============================================================

#[test]
fn parse_message_list_keeps_order_and_skips_invalid_items() {
    let items = parse_message_list(serde_json::json!([
        {"id": 1, "sender_id": 3, "content": "one", "timestamp": "10:00"},
        {"id": 2, "sender_id": 3},
        {"id": 3, "sender_id": 4, "content": "three", "timestamp": "10:02"}
    ]))
    .expect("array payload");
    let ids = items.iter().map(|m| m.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec![Some(MessageId::Int(1)), Some(MessageId::Int(3))]);
}

#[test]
fn parse_message_list_rejects_non_array() {
    let err = parse_message_list(serde_json::json!({"messages": []})).expect_err("object payload");
    assert!(matches!(err, ChatError::Decode(_)));
}

#[test]
fn parse_message_list_json_reports_bad_json() {
    assert!(matches!(parse_message_list_json("[{"), Err(ChatError::Decode(_))));
    assert_eq!(parse_message_list_json("[]").expect("empty list").len(), 0);
}

// =============================================================
// parse_send_response
// =============================================================

#[test]
fn send_response_prefers_messages_array() {
    let messages = parse_send_response(serde_json::json!({
        "status": "success",
        "messages": [
            {"id": 10, "sender_id": 3, "content": "question", "timestamp": "t"},
            {"id": 11, "sender_id": 0, "content": "answer", "timestamp": "t"}
        ],
        "message": {"id": 99, "content": "ignored"}
    }))
    .expect("success");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "answer");
}

#[test]
fn send_response_falls_back_to_single_message() {
    let messages = parse_send_response(serde_json::json!({
        "status": "success",
        "message": {"id": 10, "content": "hello"}
    }))
    .expect("success");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, Some(MessageId::Int(10)));
}

#[test]
fn send_response_success_without_payload_is_empty() {
    let messages = parse_send_response(serde_json::json!({"status": "success"})).expect("success");
    assert!(messages.is_empty());
}

#[test]
fn send_response_non_success_status_is_rejected() {
    let err = parse_send_response(serde_json::json!({"status": "error", "message": "chat closed"}))
        .expect_err("rejected");
    assert_eq!(err, ChatError::Rejected("chat closed".to_owned()));
}

#[test]
fn send_response_missing_status_is_rejected() {
    let err = parse_send_response(serde_json::json!({"messages": []})).expect_err("rejected");
    assert_eq!(err, ChatError::Rejected("missing status".to_owned()));
}
