//! Leptos components for the chat view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read `ChatState` and `NotificationState` from context and never
//! talk to the network directly; sending and typing go through callbacks
//! wired by `app::ChatRoot`.

pub mod chat_panel;
pub mod message_item;
pub mod notification_stack;
pub mod typing_indicator;
