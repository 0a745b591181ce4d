//! Deferred tasks on the transport clock
//!
//! A task is a deadline plus an id. Nothing here owns a timer thread: the
//! owner asks `is_due(now)` from whatever drives it (the position poller, a
//! test advancing a virtual clock), and cancelling is dropping the task.

use std::fmt;

/// Identifies one armed task; ids are never reused by the same owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A one-shot action due `delay` seconds after `armed_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTask {
    id: TaskId,
    armed_at: f64,
    delay: f64,
}

impl ScheduledTask {
    /// Arm a task at clock time `now`; negative or NaN delays fire immediately
    pub fn new(id: TaskId, now: f64, delay: f64) -> Self {
        let delay = if delay.is_nan() { 0.0 } else { delay.max(0.0) };
        Self {
            id,
            armed_at: now,
            delay,
        }
    }

    /// Task id
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Clock time the task was armed
    pub fn armed_at(&self) -> f64 {
        self.armed_at
    }

    /// Requested delay in seconds
    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Clock time at which the task becomes due
    pub fn deadline(&self) -> f64 {
        self.armed_at + self.delay
    }

    /// `now - armed_at >= delay`
    pub fn is_due(&self, now: f64) -> bool {
        now - self.armed_at >= self.delay
    }

    /// Seconds left until due (0 once due)
    pub fn remaining(&self, now: f64) -> f64 {
        (self.deadline() - now).max(0.0)
    }
}
