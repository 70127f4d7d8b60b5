//! REST helpers for the chat endpoints.
//!
//! Client-side (csr): real HTTP calls via `gloo-net`.
//! Everywhere else only the pure request/response helpers are compiled, and
//! tests drive the sync paths through a fake [`ChatTransport`].
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<_, ChatError>`. A send is only successful when
//! the HTTP status is 2xx *and* the body says `"status": "success"`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::error::ChatError;
use super::types::{Message, SEND_STATUS_SUCCESS, SendMessageRequest};

/// Header carrying the page's CSRF token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Request/response transport used by the polling loop and the send pipeline.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    /// Fetch the full ordered message list for `chat_id`.
    async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatError>;

    /// Submit one outgoing message and return the messages the server created.
    async fn send_message(&self, request: &SendMessageRequest) -> Result<Vec<Message>, ChatError>;
}

#[cfg(any(test, feature = "csr"))]
pub(crate) fn messages_endpoint(base: &str, chat_id: i64) -> String {
    format!("{}/{chat_id}", base.trim_end_matches('/'))
}

/// Parse a message list, skipping entries that are not valid messages.
///
/// # Errors
///
/// Returns [`ChatError::Decode`] if the payload is not a JSON array.
pub fn parse_message_list(value: serde_json::Value) -> Result<Vec<Message>, ChatError> {
    let serde_json::Value::Array(items) = value else {
        return Err(ChatError::Decode("expected an array of messages".to_owned()));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Message>(item).ok())
        .collect())
}

/// Parse a message list from raw JSON text, e.g. the page's embedded batch.
///
/// # Errors
///
/// Returns [`ChatError::Decode`] on invalid JSON or a non-array payload.
pub fn parse_message_list_json(json: &str) -> Result<Vec<Message>, ChatError> {
    let value = serde_json::from_str(json).map_err(|e| ChatError::Decode(e.to_string()))?;
    parse_message_list(value)
}

/// Interpret the body of a 2xx `/send_message` response.
///
/// A `messages` array (own message plus an automated reply) wins over a
/// single `message`. A success with neither yields an empty list.
///
/// # Errors
///
/// Returns [`ChatError::Rejected`] when `status` is anything but `"success"`.
pub fn parse_send_response(body: serde_json::Value) -> Result<Vec<Message>, ChatError> {
    let status = body.get("status").and_then(serde_json::Value::as_str);
    if status != Some(SEND_STATUS_SUCCESS) {
        let reason = body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .or_else(|| body.get("message").and_then(serde_json::Value::as_str))
            .or(status)
            .unwrap_or("missing status");
        return Err(ChatError::Rejected(reason.to_owned()));
    }

    if let Some(items) = body.get("messages").filter(|v| v.is_array()) {
        return parse_message_list(items.clone());
    }

    Ok(body
        .get("message")
        .cloned()
        .and_then(|v| serde_json::from_value::<Message>(v).ok())
        .into_iter()
        .collect())
}

/// Browser transport backed by `gloo-net`.
#[cfg(feature = "csr")]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    send_endpoint: String,
    messages_endpoint: String,
    csrf_token: Option<String>,
}

#[cfg(feature = "csr")]
impl HttpTransport {
    #[must_use]
    pub fn from_session(session: &crate::state::session::ChatSession) -> Self {
        Self {
            send_endpoint: session.config.send_endpoint.clone(),
            messages_endpoint: session.config.messages_endpoint.clone(),
            csrf_token: session.csrf_token.clone(),
        }
    }
}

#[cfg(feature = "csr")]
impl ChatTransport for HttpTransport {
    async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatError> {
        let url = messages_endpoint(&self.messages_endpoint, chat_id);
        let resp = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(ChatError::Status(resp.status()));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        parse_message_list(body)
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<Vec<Message>, ChatError> {
        let mut builder = gloo_net::http::Request::post(&self.send_endpoint);
        if let Some(token) = self.csrf_token.as_deref() {
            builder = builder.header(CSRF_HEADER, token);
        }
        let resp = builder
            .json(request)
            .map_err(|e| ChatError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(ChatError::Status(resp.status()));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        parse_send_response(body)
    }
}

/// Scripted transport for exercising the sync paths in tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub fetch_responses: std::cell::RefCell<std::collections::VecDeque<Result<Vec<Message>, ChatError>>>,
    pub send_responses: std::cell::RefCell<std::collections::VecDeque<Result<Vec<Message>, ChatError>>>,
    pub fetched: std::cell::RefCell<Vec<i64>>,
    pub sent: std::cell::RefCell<Vec<SendMessageRequest>>,
}

#[cfg(test)]
impl FakeTransport {
    pub fn queue_fetch(&self, result: Result<Vec<Message>, ChatError>) {
        self.fetch_responses.borrow_mut().push_back(result);
    }

    pub fn queue_send(&self, result: Result<Vec<Message>, ChatError>) {
        self.send_responses.borrow_mut().push_back(result);
    }

    pub fn request_count(&self) -> usize {
        self.fetched.borrow().len() + self.sent.borrow().len()
    }
}

#[cfg(test)]
impl ChatTransport for FakeTransport {
    async fn fetch_messages(&self, chat_id: i64) -> Result<Vec<Message>, ChatError> {
        self.fetched.borrow_mut().push(chat_id);
        self.fetch_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("no scripted response".to_owned())))
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<Vec<Message>, ChatError> {
        self.sent.borrow_mut().push(request.clone());
        self.send_responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Transport("no scripted response".to_owned())))
    }
}
