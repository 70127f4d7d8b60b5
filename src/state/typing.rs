//! "X is typing..." indicator with a self-resetting hide timer.
//!
//! Each `show` replaces the label and pushes the hide deadline out to
//! `hide_after_ms` from now, so a steady stream of typing events keeps the
//! indicator up and silence hides it exactly once.

#[cfg(test)]
#[path = "typing_test.rs"]
mod typing_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::util::schedule::{Scheduler, TaskSlot};

pub struct TypingIndicator<S: Scheduler> {
    inner: Rc<RefCell<TypingInner<S>>>,
}

struct TypingInner<S: Scheduler> {
    hide_after_ms: u32,
    label: Option<String>,
    hide_task: TaskSlot<S>,
    on_change: Rc<dyn Fn(Option<String>)>,
}

impl<S: Scheduler + 'static> TypingIndicator<S> {
    /// `on_change` receives the new label whenever visibility or text changes.
    pub fn new(scheduler: S, hide_after_ms: u32, on_change: impl Fn(Option<String>) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TypingInner {
                hide_after_ms,
                label: None,
                hide_task: TaskSlot::new(scheduler),
                on_change: Rc::new(on_change),
            })),
        }
    }

    /// Show `username` as typing. Blank names are ignored.
    pub fn show(&self, username: &str) -> bool {
        let username = username.trim();
        if username.is_empty() {
            return false;
        }
        let label = typing_label(username);
        let notify = {
            let mut inner = self.inner.borrow_mut();
            let weak = Rc::downgrade(&self.inner);
            let delay = inner.hide_after_ms;
            inner.hide_task.reschedule(delay, move || hide_from_timer(&weak));
            if inner.label.as_deref() == Some(label.as_str()) {
                None
            } else {
                inner.label = Some(label.clone());
                Some(inner.on_change.clone())
            }
        };
        if let Some(on_change) = notify {
            on_change(Some(label));
        }
        true
    }

    pub fn hide(&self) {
        let notify = {
            let mut inner = self.inner.borrow_mut();
            inner.hide_task.cancel();
            inner.label.take().map(|_| inner.on_change.clone())
        };
        if let Some(on_change) = notify {
            on_change(None);
        }
    }

    pub fn label(&self) -> Option<String> {
        self.inner.borrow().label.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().label.is_some()
    }
}

pub fn typing_label(username: &str) -> String {
    format!("{username} is typing...")
}

fn hide_from_timer<S: Scheduler>(weak: &Weak<RefCell<TypingInner<S>>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let notify = {
        let mut inner = inner.borrow_mut();
        inner.label.take().map(|_| inner.on_change.clone())
    };
    if let Some(on_change) = notify {
        on_change(None);
    }
}
