//! Tunables for the chat sync layer.
//!
//! DESIGN
//! ======
//! Every value has a compiled-in default. A page can override any of them with
//! `data-*` attributes on the messages container (`data-poll-interval="5000"`);
//! values that are missing or fail to parse fall back to the default rather
//! than disabling the chat.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_POLL_INTERVAL_MS: u32 = 3000;
pub const DEFAULT_TYPING_HIDE_MS: u32 = 2000;
pub const DEFAULT_TYPING_THROTTLE_MS: u32 = 1000;
pub const DEFAULT_NOTIFICATION_MS: u32 = 3000;
pub const DEFAULT_INITIAL_STAGGER_MS: u32 = 40;
pub const DEFAULT_APPEAR_MS: u32 = 500;
pub const DEFAULT_RECONNECT_INITIAL_MS: u32 = 1000;
pub const DEFAULT_RECONNECT_MAX_MS: u32 = 10_000;

pub const DEFAULT_SEND_ENDPOINT: &str = "/send_message";
pub const DEFAULT_MESSAGES_ENDPOINT: &str = "/get_messages";
pub const DEFAULT_SOCKET_PATH: &str = "/ws/chat";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Attribute names (without the `data-` prefix) read from the messages container.
pub const DATA_KEYS: &[&str] = &[
    "poll-interval",
    "typing-hide",
    "typing-throttle",
    "notification-timeout",
    "initial-stagger",
    "appear-duration",
    "reconnect-initial",
    "reconnect-max",
    "send-endpoint",
    "messages-endpoint",
    "socket-path",
    "log-level",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    pub poll_interval_ms: u32,
    pub typing_hide_ms: u32,
    pub typing_throttle_ms: u32,
    pub notification_ms: u32,
    pub initial_stagger_ms: u32,
    /// How long a node keeps its entrance-animation class.
    pub appear_ms: u32,
    pub reconnect_initial_ms: u32,
    pub reconnect_max_ms: u32,
    pub send_endpoint: String,
    pub messages_endpoint: String,
    pub socket_path: String,
    pub log_level: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            typing_hide_ms: DEFAULT_TYPING_HIDE_MS,
            typing_throttle_ms: DEFAULT_TYPING_THROTTLE_MS,
            notification_ms: DEFAULT_NOTIFICATION_MS,
            initial_stagger_ms: DEFAULT_INITIAL_STAGGER_MS,
            appear_ms: DEFAULT_APPEAR_MS,
            reconnect_initial_ms: DEFAULT_RECONNECT_INITIAL_MS,
            reconnect_max_ms: DEFAULT_RECONNECT_MAX_MS,
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_owned(),
            messages_endpoint: DEFAULT_MESSAGES_ENDPOINT.to_owned(),
            socket_path: DEFAULT_SOCKET_PATH.to_owned(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

impl ChatConfig {
    /// Build a config from a `data-*` attribute lookup keyed by [`DATA_KEYS`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let reconnect_initial_ms = parse_interval(lookup("reconnect-initial"), DEFAULT_RECONNECT_INITIAL_MS);
        Self {
            poll_interval_ms: parse_interval(lookup("poll-interval"), DEFAULT_POLL_INTERVAL_MS),
            typing_hide_ms: parse_interval(lookup("typing-hide"), DEFAULT_TYPING_HIDE_MS),
            typing_throttle_ms: parse_interval(lookup("typing-throttle"), DEFAULT_TYPING_THROTTLE_MS),
            notification_ms: parse_interval(lookup("notification-timeout"), DEFAULT_NOTIFICATION_MS),
            initial_stagger_ms: parse_or(lookup("initial-stagger"), DEFAULT_INITIAL_STAGGER_MS),
            appear_ms: parse_interval(lookup("appear-duration"), DEFAULT_APPEAR_MS),
            reconnect_initial_ms,
            reconnect_max_ms: parse_interval(lookup("reconnect-max"), DEFAULT_RECONNECT_MAX_MS)
                .max(reconnect_initial_ms),
            send_endpoint: text_or(lookup("send-endpoint"), DEFAULT_SEND_ENDPOINT),
            messages_endpoint: text_or(lookup("messages-endpoint"), DEFAULT_MESSAGES_ENDPOINT),
            socket_path: text_or(lookup("socket-path"), DEFAULT_SOCKET_PATH),
            log_level: text_or(lookup("log-level"), DEFAULT_LOG_LEVEL),
        }
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Like [`parse_or`], but a zero interval would spin a timer, so it falls back too.
fn parse_interval(raw: Option<String>, default: u32) -> u32 {
    match parse_or(raw, default) {
        0 => default,
        n => n,
    }
}

fn text_or(raw: Option<String>, default: &str) -> String {
    raw.map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
