//! Transport state machine
//!
//! The timing state of the transport as one value, with transitions as a
//! pure function `(state, event) -> state`. The `Transport` pairs each
//! transition with its side effects (cancelling and scheduling segments);
//! everything about *where on the timeline we are* lives here.

use serde::{Deserialize, Serialize};

use crate::types::TransportStatus;

/// Input to the state machine
///
/// Positions carried by events are expected to be already clamped to the
/// timeline by the caller; `now` is a reading of the transport clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// A new run was scheduled starting at `from`
    Start {
        /// Timeline position of the run's first sample
        from: f64,
        /// Clock reading when the run was scheduled
        now: f64,
    },

    /// Freeze the position; ignored unless playing
    Pause {
        /// Clock reading at the pause
        now: f64,
        /// Timeline length, caps the frozen position
        total: f64,
    },

    /// Back to the beginning, stopped
    Stop,

    /// Stopped with the position left at `position` (natural end, output failure)
    Halt {
        /// Where the position stays
        position: f64,
    },

    /// Jump to `position` without changing status
    Seek {
        /// Target timeline position
        position: f64,
        /// Clock reading at the jump
        now: f64,
    },

    /// Same as `Seek`, after the catalog moved tracks around the position
    Retarget {
        /// Re-derived timeline position
        position: f64,
        /// Clock reading at the edit
        now: f64,
    },
}

/// Transport status plus the anchor the position is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportState {
    status: TransportStatus,
    /// Timeline position at `anchor_clock` (meaningful while playing)
    anchor_position: f64,
    /// Clock reading when the anchor was set (meaningful while playing)
    anchor_clock: f64,
    /// Position while paused or stopped
    frozen_position: f64,
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportState {
    /// Stopped at position 0
    pub fn new() -> Self {
        Self {
            status: TransportStatus::Stopped,
            anchor_position: 0.0,
            anchor_clock: 0.0,
            frozen_position: 0.0,
        }
    }

    /// Current status
    pub fn status(&self) -> TransportStatus {
        self.status
    }

    /// `(timeline position, clock time)` anchor, only while playing
    pub fn anchor(&self) -> Option<(f64, f64)> {
        (self.status == TransportStatus::Playing)
            .then_some((self.anchor_position, self.anchor_clock))
    }

    /// Timeline position at clock time `now`, capped at `total`
    pub fn position(&self, now: f64, total: f64) -> f64 {
        let raw = match self.status {
            TransportStatus::Playing => {
                self.anchor_position + (now - self.anchor_clock).max(0.0)
            }
            TransportStatus::Paused | TransportStatus::Stopped => self.frozen_position,
        };
        raw.min(total).max(0.0)
    }

    /// Where a `play(requested)` call should actually start
    ///
    /// Clamps into `[0, total]`; a stopped transport asked to play at or past
    /// the end rewinds to 0.
    pub fn resolve_start(&self, requested: f64, total: f64) -> f64 {
        let from = clamp_position(requested, total);
        if self.status == TransportStatus::Stopped && from >= total {
            0.0
        } else {
            from
        }
    }

    /// Apply one transition
    #[must_use]
    pub fn apply(self, event: TransportEvent) -> Self {
        match event {
            TransportEvent::Start { from, now } => Self {
                status: TransportStatus::Playing,
                anchor_position: from,
                anchor_clock: now,
                frozen_position: from,
            },
            TransportEvent::Pause { now, total } => {
                if self.status != TransportStatus::Playing {
                    return self;
                }
                Self {
                    status: TransportStatus::Paused,
                    frozen_position: self.position(now, total),
                    ..self
                }
            }
            TransportEvent::Stop => Self::new(),
            TransportEvent::Halt { position } => Self {
                status: TransportStatus::Stopped,
                frozen_position: position,
                ..Self::new()
            },
            TransportEvent::Seek { position, now } | TransportEvent::Retarget { position, now } => {
                match self.status {
                    TransportStatus::Playing => Self {
                        anchor_position: position,
                        anchor_clock: now,
                        frozen_position: position,
                        ..self
                    },
                    TransportStatus::Paused | TransportStatus::Stopped => Self {
                        frozen_position: position,
                        ..self
                    },
                }
            }
        }
    }
}

/// Clamp a requested position into `[0, total]`; NaN maps to 0
pub fn clamp_position(position: f64, total: f64) -> f64 {
    if position.is_nan() {
        return 0.0;
    }
    position.clamp(0.0, total.max(0.0))
}
