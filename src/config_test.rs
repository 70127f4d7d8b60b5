use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect::<HashMap<_, _>>();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_lookup_yields_defaults() {
    assert_eq!(ChatConfig::from_lookup(|_| None), ChatConfig::default());
}

#[test]
fn defaults_match_documented_timings() {
    let config = ChatConfig::default();
    assert_eq!(config.poll_interval_ms, 3000);
    assert_eq!(config.typing_hide_ms, 2000);
    assert_eq!(config.typing_throttle_ms, 1000);
    assert_eq!(config.send_endpoint, "/send_message");
    assert_eq!(config.messages_endpoint, "/get_messages");
}

#[test]
fn overrides_are_applied() {
    let config = ChatConfig::from_lookup(lookup_from(&[
        ("poll-interval", "5000"),
        ("typing-hide", " 1500 "),
        ("socket-path", "/socket"),
    ]));
    assert_eq!(config.poll_interval_ms, 5000);
    assert_eq!(config.typing_hide_ms, 1500);
    assert_eq!(config.socket_path, "/socket");
    assert_eq!(config.typing_throttle_ms, DEFAULT_TYPING_THROTTLE_MS);
}

#[test]
fn invalid_or_zero_intervals_fall_back() {
    let config = ChatConfig::from_lookup(lookup_from(&[
        ("poll-interval", "soon"),
        ("typing-throttle", "0"),
        ("send-endpoint", "   "),
    ]));
    assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    assert_eq!(config.typing_throttle_ms, DEFAULT_TYPING_THROTTLE_MS);
    assert_eq!(config.send_endpoint, DEFAULT_SEND_ENDPOINT);
}

#[test]
fn zero_stagger_is_allowed() {
    let config = ChatConfig::from_lookup(lookup_from(&[("initial-stagger", "0")]));
    assert_eq!(config.initial_stagger_ms, 0);
}

#[test]
fn reconnect_max_never_below_initial() {
    let config = ChatConfig::from_lookup(lookup_from(&[
        ("reconnect-initial", "4000"),
        ("reconnect-max", "2000"),
    ]));
    assert_eq!(config.reconnect_max_ms, 4000);
}

#[test]
fn every_lookup_key_is_listed() {
    let seen = std::cell::RefCell::new(Vec::new());
    let _ = ChatConfig::from_lookup(|key| {
        seen.borrow_mut().push(key.to_owned());
        None
    });
    let mut seen = seen.into_inner();
    seen.sort();
    let mut listed = DATA_KEYS.iter().map(|k| (*k).to_owned()).collect::<Vec<_>>();
    listed.sort();
    assert_eq!(seen, listed);
}
