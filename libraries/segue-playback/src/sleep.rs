//! Sleep timer
//!
//! At most one deferred stop. The transport disarms it on every transition
//! out of `Playing`; `take_due` hands out a due deadline exactly once.

use crate::task::{ScheduledTask, TaskId};

/// Single-slot deferred stop
#[derive(Debug, Clone, Default)]
pub struct SleepTimer {
    pending: Option<ScheduledTask>,
    next_id: u64,
}

impl SleepTimer {
    /// Create a disarmed timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `duration` seconds from `now`, replacing any prior deadline
    pub fn arm(&mut self, now: f64, duration: f64) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.pending = Some(ScheduledTask::new(id, now, duration));
        id
    }

    /// Cancel the pending deadline, returning it if one was armed
    pub fn disarm(&mut self) -> Option<ScheduledTask> {
        self.pending.take()
    }

    /// Whether a deadline is pending
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending deadline
    pub fn pending(&self) -> Option<&ScheduledTask> {
        self.pending.as_ref()
    }

    /// Seconds until the deadline, if armed
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.pending.as_ref().map(|task| task.remaining(now))
    }

    /// Disarm and return the task if it is due at `now`
    pub fn take_due(&mut self, now: f64) -> Option<ScheduledTask> {
        if self.pending.as_ref().is_some_and(|task| task.is_due(now)) {
            self.pending.take()
        } else {
            None
        }
    }
}
