//! Scheduled-task abstraction with cancel-and-reschedule semantics.
//!
//! DESIGN
//! ======
//! A [`Scheduler`] hands back a handle per task; dropping the handle cancels
//! the task. [`TaskSlot`] owns at most one handle, so rescheduling drops the
//! previous one first (last writer wins). The browser implementation is a thin
//! wrapper over `gloo_timers::callback::Timeout`, which already cancels on
//! drop. Tests use [`ManualScheduler`] and advance virtual time explicitly.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

/// Source of time and deferred execution.
pub trait Scheduler {
    /// Cancels the task when dropped.
    type Handle;

    /// Current time in milliseconds.
    fn now_ms(&self) -> f64;

    /// Run `task` once after `delay_ms`.
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Holds at most one pending task from a scheduler.
pub struct TaskSlot<S: Scheduler> {
    scheduler: S,
    pending: Option<S::Handle>,
}

impl<S: Scheduler> TaskSlot<S> {
    pub fn new(scheduler: S) -> Self {
        Self { scheduler, pending: None }
    }

    /// Cancel whatever is pending and schedule `task` in its place.
    pub fn reschedule(&mut self, delay_ms: u32, task: impl FnOnce() + 'static) {
        self.pending = None;
        self.pending = Some(self.scheduler.schedule(delay_ms, Box::new(task)));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }
}

/// Browser scheduler: `setTimeout` through `gloo-timers`, wall clock from `Date.now()`.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

#[cfg(feature = "csr")]
impl Scheduler for BrowserScheduler {
    type Handle = gloo_timers::callback::Timeout;

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle {
        gloo_timers::callback::Timeout::new(delay_ms, task)
    }
}

/// Virtual-time scheduler for deterministic tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ManualScheduler {
    inner: std::rc::Rc<std::cell::RefCell<ManualClock>>,
}

#[cfg(test)]
#[derive(Default)]
struct ManualClock {
    now_ms: f64,
    next_id: u64,
    tasks: Vec<ManualTask>,
}

#[cfg(test)]
struct ManualTask {
    id: u64,
    due_ms: f64,
    run: Box<dyn FnOnce()>,
}

#[cfg(test)]
pub(crate) struct ManualHandle {
    id: u64,
    clock: std::rc::Weak<std::cell::RefCell<ManualClock>>,
}

#[cfg(test)]
impl Drop for ManualHandle {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().tasks.retain(|t| t.id != self.id);
        }
    }
}

#[cfg(test)]
impl ManualScheduler {
    /// Advance virtual time to `target_ms`, running due tasks in deadline order.
    ///
    /// Tasks scheduled by running tasks are honored if they fall due before
    /// `target_ms`.
    pub fn advance_to(&self, target_ms: f64) {
        loop {
            let next = {
                let mut clock = self.inner.borrow_mut();
                let due = clock
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due_ms <= target_ms)
                    .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
                    .map(|(idx, _)| idx);
                due.map(|idx| {
                    let task = clock.tasks.remove(idx);
                    clock.now_ms = clock.now_ms.max(task.due_ms);
                    task
                })
            };
            match next {
                Some(task) => (task.run)(),
                None => break,
            }
        }
        let mut clock = self.inner.borrow_mut();
        clock.now_ms = clock.now_ms.max(target_ms);
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle {
        let mut clock = self.inner.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let due_ms = clock.now_ms + f64::from(delay_ms);
        clock.tasks.push(ManualTask { id, due_ms, run: task });
        ManualHandle { id, clock: std::rc::Rc::downgrade(&self.inner) }
    }
}
