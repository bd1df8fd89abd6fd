//! Cancellable delayed tasks driven by an external clock.
//!
//! Nothing here sleeps or spawns timers: the owner schedules work at an
//! absolute time and drains whatever is due from its frame loop, which keeps
//! tests in control of time.

use fnv::FnvHashMap;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

pub struct TaskQueue<T> {
    // (due time in microseconds, sequence) keeps FIFO order among equal due times
    tasks: BTreeMap<(i64, u64), T>,
    due_by_id: FnvHashMap<u64, i64>,
    next_seq: u64,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn to_micros(seconds: f64) -> i64 {
    (seconds * 1e6).round() as i64
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            due_by_id: FnvHashMap::default(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due_sec: f64, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = to_micros(due_sec);
        self.tasks.insert((due, seq), task);
        self.due_by_id.insert(seq, due);
        TaskId(seq)
    }

    /// Remove a pending task. Returns `None` if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let due = self.due_by_id.remove(&id.0)?;
        self.tasks.remove(&(due, id.0))
    }

    /// Pop the earliest task due at or before `now_sec`.
    pub fn pop_due(&mut self, now_sec: f64) -> Option<T> {
        let now = to_micros(now_sec);
        let (&(due, seq), _) = self.tasks.iter().next()?;
        if due > now {
            return None;
        }
        self.due_by_id.remove(&seq);
        self.tasks.remove(&(due, seq))
    }

    pub fn next_due(&self) -> Option<f64> {
        self.tasks.keys().next().map(|(due, _)| *due as f64 / 1e6)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every pending task, returning them in due order.
    pub fn drain(&mut self) -> Vec<T> {
        self.due_by_id.clear();
        std::mem::take(&mut self.tasks).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order_then_fifo() {
        let mut q = TaskQueue::new();
        q.schedule(2.0, "late");
        q.schedule(1.0, "first");
        q.schedule(1.0, "second");
        assert_eq!(q.pop_due(0.5), None);
        assert_eq!(q.pop_due(1.0), Some("first"));
        assert_eq!(q.pop_due(1.0), Some("second"));
        assert_eq!(q.pop_due(1.5), None);
        assert_eq!(q.next_due(), Some(2.0));
        assert_eq!(q.pop_due(3.0), Some("late"));
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_is_single_shot() {
        let mut q = TaskQueue::new();
        let id = q.schedule(1.0, 7);
        assert_eq!(q.cancel(id), Some(7));
        assert_eq!(q.cancel(id), None);
        assert_eq!(q.pop_due(10.0), None);
    }
}
