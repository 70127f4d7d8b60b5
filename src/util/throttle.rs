//! Leading-edge rate limiter with a single trailing call.
//!
//! The first trigger in a quiet period fires immediately. Triggers arriving
//! within `wait_ms` of the last fire are coalesced into one trailing fire at
//! the end of the window, so a burst produces at most two calls per window.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::schedule::{Scheduler, TaskSlot};

pub struct Throttle<S: Scheduler> {
    inner: Rc<RefCell<ThrottleInner<S>>>,
}

struct ThrottleInner<S: Scheduler> {
    wait_ms: f64,
    last_fired_ms: Option<f64>,
    trailing: TaskSlot<S>,
    action: Rc<dyn Fn()>,
}

impl<S: Scheduler + 'static> Throttle<S> {
    pub fn new(scheduler: S, wait_ms: u32, action: impl Fn() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ThrottleInner {
                wait_ms: f64::from(wait_ms),
                last_fired_ms: None,
                trailing: TaskSlot::new(scheduler),
                action: Rc::new(action),
            })),
        }
    }

    /// Record one event; fires now or (re)arms the trailing call.
    pub fn trigger(&self) {
        let fire_now = {
            let mut inner = self.inner.borrow_mut();
            let now = inner.trailing.now_ms();
            let remaining = inner
                .last_fired_ms
                .map_or(0.0, |last| inner.wait_ms - (now - last));

            if remaining <= 0.0 {
                inner.trailing.cancel();
                inner.last_fired_ms = Some(now);
                Some(inner.action.clone())
            } else {
                let weak = Rc::downgrade(&self.inner);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let delay_ms = remaining.ceil() as u32;
                inner.trailing.reschedule(delay_ms, move || fire_trailing(&weak));
                None
            }
        };

        if let Some(action) = fire_now {
            action();
        }
    }

    /// Drop a pending trailing call without firing it.
    pub fn cancel(&self) {
        self.inner.borrow_mut().trailing.cancel();
    }
}

fn fire_trailing<S: Scheduler>(weak: &Weak<RefCell<ThrottleInner<S>>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let action = {
        let mut inner = inner.borrow_mut();
        let now = inner.trailing.now_ms();
        inner.last_fired_ms = Some(now);
        inner.action.clone()
    };
    action();
}
