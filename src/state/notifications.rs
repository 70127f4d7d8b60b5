//! Transient user-facing notifications.
//!
//! One `NotificationState` per mounted view, held in an `RwSignal`. The
//! `NotificationStack` component renders it and schedules auto-dismissal.

#[cfg(test)]
#[path = "notifications_test.rs"]
mod notifications_test;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl NotificationKind {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notification notification-success",
            Self::Error => "notification notification-error",
            Self::Warning => "notification notification-warning",
            Self::Info => "notification notification-info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct NotificationState {
    pub items: Vec<Notification>,
    next_id: u64,
}

impl NotificationState {
    /// Append a notification and return its id.
    pub fn push(&mut self, kind: NotificationKind, text: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notification { id, kind, text: text.into() });
        id
    }

    /// Remove notification `id`. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}
