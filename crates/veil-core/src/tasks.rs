use std::rc::Rc;

use web_time::{Duration, Instant};

use crate::Clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum When {
    Frame,
    At(Instant),
}

struct Entry<T> {
    id: TaskId,
    when: When,
    task: T,
}

/// Deferred component work: "on the next animation frame" and "after a
/// timeout". The host drives it by calling `take_frame` once per frame and
/// `take_due` whenever timers may have expired.
pub struct TaskQueue<T> {
    clock: Rc<dyn Clock>,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> TaskQueue<T> {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            next_id: 1,
            entries: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn push(&mut self, when: When, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, when, task });
        id
    }

    pub fn request_frame(&mut self, task: T) -> TaskId {
        self.push(When::Frame, task)
    }

    pub fn set_timeout(&mut self, delay: Duration, task: T) -> TaskId {
        let at = self.clock.now() + delay;
        self.push(When::At(at), task)
    }

    /// Returns `false` if the task already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Frame tasks queued so far, in request order. Tasks requested while the
    /// caller processes these belong to the following frame.
    pub fn take_frame(&mut self) -> Vec<T> {
        self.drain_where(|w| w == When::Frame)
    }

    /// Expired timeouts, earliest deadline first.
    pub fn take_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let mut due: Vec<(Instant, TaskId, T)> = Vec::new();
        let mut rest = Vec::with_capacity(self.entries.len());
        for e in self.entries.drain(..) {
            match e.when {
                When::At(at) if at <= now => due.push((at, e.id, e.task)),
                _ => rest.push(e),
            }
        }
        self.entries = rest;
        due.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        due.into_iter().map(|(_, _, t)| t).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter_map(|e| match e.when {
                When::At(at) => Some(at),
                When::Frame => None,
            })
            .min()
    }

    /// Drop every pending task `f` selects. Returns how many were removed.
    pub fn cancel_where(&mut self, f: impl Fn(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !f(&e.task));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn drain_where(&mut self, keep_out: impl Fn(When) -> bool) -> Vec<T> {
        let mut out = Vec::new();
        let mut rest = Vec::with_capacity(self.entries.len());
        for e in self.entries.drain(..) {
            if keep_out(e.when) {
                out.push(e.task);
            } else {
                rest.push(e);
            }
        }
        self.entries = rest;
        out
    }
}

impl<T> std::fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.entries.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
