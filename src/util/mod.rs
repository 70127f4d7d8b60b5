//! Small helpers shared by the chat components and sync paths.

#[cfg(feature = "csr")]
pub mod dom;
pub mod schedule;
pub mod throttle;
