//! Set of message ids already rendered by this view.
//!
//! The set is the only deduplication authority: push and send paths consult
//! it before rendering, and only the polling snapshot resets it.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use std::collections::HashSet;

use crate::net::types::MessageId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageIdentitySet {
    ids: HashSet<MessageId>,
}

impl MessageIdentitySet {
    pub fn has(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Record `id`. Returns `false` if it was already present.
    pub fn add(&mut self, id: MessageId) -> bool {
        self.ids.insert(id)
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageId> {
        self.ids.iter()
    }
}
