//! Client-side state for one mounted chat view.
//!
//! `ChatState` lives in an `RwSignal` provided through context. The session,
//! typing indicator and notifications sit beside it so components can read
//! exactly the slice they render.

pub mod chat;
pub mod identity;
pub mod notifications;
pub mod session;
pub mod typing;
