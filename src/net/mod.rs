//! Networking modules for the chat endpoints and the push channel.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `polling` and `send` are the two request/response
//! sync paths, `push_client` manages the realtime WebSocket lifecycle, and
//! `types` defines the shared wire schema.

pub mod api;
pub mod error;
pub mod polling;
pub mod push_client;
pub mod send;
pub mod types;
