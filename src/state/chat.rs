//! Rendered message list and its reconciliation rules.
//!
//! DESIGN
//! ======
//! Three sources write into one list. Push and send responses are merged
//! incrementally and deduplicated against [`MessageIdentitySet`]. The polling
//! snapshot replaces the list wholesale and is the only path that resets the
//! set.
//!
//! A snapshot is taken against a [`PollTicket`] issued before the fetch. Each
//! incremental merge bumps `revision`; when the snapshot lands, nodes merged
//! after the ticket that the server did not include yet are kept, and a
//! response older than one already applied is dropped. Without interleaved
//! merges the set equals exactly the fetched ids.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::identity::MessageIdentitySet;
use crate::net::types::{Message, MessageId};
use crate::render::{MessageNode, RenderOptions, render_message};

/// Push channel lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No socket; the view is polling-only.
    #[default]
    Disconnected,
    /// WebSocket handshake is in progress.
    Connecting,
    /// Socket open and `join` sent.
    Connected,
}

/// Which incremental path delivered a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeSource {
    Push,
    SendResponse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New id, node appended.
    Rendered,
    /// No id on a send response; appended without deduplication.
    RenderedUntracked,
    /// Id already rendered; dropped.
    Duplicate,
    /// Push message without an id; dropped.
    Malformed,
}

impl MergeOutcome {
    pub fn is_rendered(self) -> bool {
        matches!(self, Self::Rendered | Self::RenderedUntracked)
    }
}

/// Issued by [`ChatState::begin_poll`] before a snapshot fetch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollTicket {
    pub seq: u64,
    pub revision: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied { rendered: usize, retained: usize },
    /// A newer snapshot was already applied.
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct ChatState {
    viewer_id: Option<i64>,
    /// Rendered list in display order.
    pub messages: Vec<MessageNode>,
    seen: MessageIdentitySet,
    initial_animation_applied: bool,
    pub connection: ConnectionStatus,
    revision: u64,
    next_key: u64,
    poll_seq: u64,
    applied_poll_seq: u64,
    scroll_generation: u64,
}

impl ChatState {
    pub fn new(viewer_id: Option<i64>) -> Self {
        Self { viewer_id, ..Self::default() }
    }

    pub fn viewer_id(&self) -> Option<i64> {
        self.viewer_id
    }

    pub fn seen(&self) -> &MessageIdentitySet {
        &self.seen
    }

    pub fn initial_animation_applied(&self) -> bool {
        self.initial_animation_applied
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Render the page-load batch. Ids join the identity set; repeated ids
    /// within the batch are skipped.
    pub fn load_initial(&mut self, messages: Vec<Message>) -> usize {
        let mut rendered = 0;
        for message in messages {
            let fresh = message.id.as_ref().is_none_or(|id| self.seen.add(id.clone()));
            if !fresh {
                continue;
            }
            self.revision += 1;
            self.append(&message, RenderOptions::STATIC);
            rendered += 1;
        }
        if rendered > 0 {
            self.request_scroll_to_end();
        }
        rendered
    }

    /// Stagger the entrance animation over the nodes currently listed.
    ///
    /// Runs at most once per view. Returns `false` if it already ran.
    pub fn apply_initial_animation(&mut self, stagger_ms: u32) -> bool {
        if self.initial_animation_applied {
            return false;
        }
        self.initial_animation_applied = true;
        for (index, node) in self.messages.iter_mut().enumerate() {
            node.animate = true;
            node.appear_delay_ms = stagger_ms.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
        }
        true
    }

    /// Merge one message from the push channel or a send response.
    pub fn merge(&mut self, message: &Message, source: MergeSource) -> MergeOutcome {
        let options = match source {
            MergeSource::Push => RenderOptions::APPEAR,
            MergeSource::SendResponse => RenderOptions::STATIC,
        };
        let outcome = match (&message.id, source) {
            (None, MergeSource::Push) => return MergeOutcome::Malformed,
            (None, MergeSource::SendResponse) => MergeOutcome::RenderedUntracked,
            (Some(id), _) if self.seen.has(id) => return MergeOutcome::Duplicate,
            (Some(id), _) => {
                self.seen.add(id.clone());
                MergeOutcome::Rendered
            }
        };
        self.revision += 1;
        self.append(message, options);
        outcome
    }

    pub fn begin_poll(&mut self) -> PollTicket {
        self.poll_seq += 1;
        PollTicket { seq: self.poll_seq, revision: self.revision }
    }

    /// Replace the list with a fetched snapshot.
    ///
    /// A row keeps its key only when its id was already rendered with the same
    /// sender, content and timestamp; a changed row gets a fresh key so the
    /// keyed view rebuilds it from the server's copy.
    pub fn apply_snapshot(&mut self, ticket: PollTicket, messages: Vec<Message>) -> SnapshotOutcome {
        if ticket.seq <= self.applied_poll_seq {
            return SnapshotOutcome::Stale;
        }
        self.applied_poll_seq = ticket.seq;

        let fetched: HashSet<&MessageId> = messages.iter().filter_map(|m| m.id.as_ref()).collect();
        let previous = std::mem::take(&mut self.messages);
        let mut reusable: HashMap<MessageId, MessageNode> = HashMap::new();
        let mut retained = Vec::new();
        for node in previous {
            let Some(id) = node.id.clone() else {
                continue;
            };
            if !fetched.contains(&id) && node.revision > ticket.revision {
                retained.push(node);
            } else {
                reusable.entry(id).or_insert(node);
            }
        }

        self.seen.reset();
        let rendered = messages.len();
        for message in &messages {
            let mut node = render_message(message, self.viewer_id, RenderOptions::STATIC);
            let previous = message.id.as_ref().and_then(|id| reusable.remove(id));
            node.key = match previous {
                Some(old) if old.same_rendering(&node) => old.key,
                _ => self.take_key(),
            };
            node.revision = self.revision;
            if let Some(id) = &message.id {
                self.seen.add(id.clone());
            }
            self.messages.push(node);
        }

        let retained_count = retained.len();
        for node in retained {
            if let Some(id) = &node.id {
                self.seen.add(id.clone());
            }
            self.messages.push(node);
        }

        self.request_scroll_to_end();
        SnapshotOutcome::Applied { rendered, retained: retained_count }
    }

    pub fn request_scroll_to_end(&mut self) {
        self.scroll_generation += 1;
    }

    /// Bumped whenever the list should be scrolled to its end.
    pub fn scroll_generation(&self) -> u64 {
        self.scroll_generation
    }

    fn append(&mut self, message: &Message, options: RenderOptions) {
        let mut node = render_message(message, self.viewer_id, options);
        node.key = self.take_key();
        node.revision = self.revision;
        self.messages.push(node);
    }

    fn take_key(&mut self) -> u64 {
        self.next_key += 1;
        self.next_key
    }
}

/// Mutable access to the chat state of a view that may already be gone.
pub trait ChatStore {
    /// Run `f` against the state; `None` once the view has been disposed.
    fn with_chat<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R>;
}

impl ChatStore for leptos::prelude::RwSignal<ChatState> {
    fn with_chat<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        use leptos::prelude::Update;
        self.try_update(f)
    }
}

impl ChatStore for RefCell<ChatState> {
    fn with_chat<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}
