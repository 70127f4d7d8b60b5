//! Message-to-node rendering.
//!
//! DESIGN
//! ======
//! Rendering is a pure function from a [`Message`] to a [`MessageNode`]. The
//! node carries the message text verbatim; the `MessageItem` component inserts
//! it as a text child, so content is never interpreted as markup.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::net::types::{Message, MessageId};

/// Per-render presentation flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Apply the entrance animation class.
    pub animate: bool,
    /// Delay before the entrance animation starts.
    pub appear_delay_ms: u32,
}

impl RenderOptions {
    pub const STATIC: Self = Self { animate: false, appear_delay_ms: 0 };
    pub const APPEAR: Self = Self { animate: true, appear_delay_ms: 0 };
}

/// One rendered chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageNode {
    /// Local key, unique and stable for the node's lifetime.
    pub key: u64,
    pub id: Option<MessageId>,
    /// Authored by the viewer.
    pub own: bool,
    pub content: String,
    pub timestamp: String,
    pub animate: bool,
    pub appear_delay_ms: u32,
    /// Merge revision this node was rendered at.
    pub revision: u64,
}

impl MessageNode {
    /// Classes without the entrance animation.
    pub fn base_class_name(&self) -> &'static str {
        if self.own { "message own" } else { "message" }
    }

    pub fn class_name(&self) -> String {
        if self.animate {
            format!("{} msg-appear", self.base_class_name())
        } else {
            self.base_class_name().to_owned()
        }
    }

    /// Same visible row: sender side, text and timestamp all match.
    pub fn same_rendering(&self, other: &Self) -> bool {
        self.own == other.own && self.content == other.content && self.timestamp == other.timestamp
    }

    /// Inline style delaying the entrance animation, if any.
    pub fn appear_style(&self) -> Option<String> {
        (self.animate && self.appear_delay_ms > 0)
            .then(|| format!("animation-delay: {}ms", self.appear_delay_ms))
    }
}

/// Render `message` as seen by `viewer_id`.
///
/// The key and revision are left at zero; [`crate::state::chat::ChatState`]
/// assigns them when the node joins the list.
pub fn render_message(message: &Message, viewer_id: Option<i64>, options: RenderOptions) -> MessageNode {
    let own = matches!((message.sender_id, viewer_id), (Some(sender), Some(viewer)) if sender == viewer);
    MessageNode {
        key: 0,
        id: message.id.clone(),
        own,
        content: message.content.clone(),
        timestamp: message.timestamp.clone(),
        animate: options.animate,
        appear_delay_ms: options.appear_delay_ms,
        revision: 0,
    }
}
