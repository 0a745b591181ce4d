//! Segment types handed to the output graph
//!
//! A `ScheduledSegment` is one track's playback window pinned to an absolute
//! time on the output clock, together with the gain envelope the output
//! applies relative to the segment's own start.

use super::audio::AudioBuffer;
use super::ids::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Linear attack / hold / release gain envelope
///
/// Times are seconds relative to the segment start. The gain rises 0→1 over
/// `attack`, holds at 1, then falls 1→0 over the final `release` seconds of
/// `length`. Ramps keep their slope when the segment is too short to hold:
/// if they overlap, the segment gain is the lower of the two ramps. Gains of
/// different segments are never renormalized against each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeEnvelope {
    /// Fade-in duration
    pub attack: f64,
    /// Fade-out duration, ending at `length`
    pub release: f64,
    /// Total segment length
    pub length: f64,
}

impl FadeEnvelope {
    /// Build an envelope; negative inputs are treated as zero
    pub fn new(attack: f64, release: f64, length: f64) -> Self {
        Self {
            attack: attack.max(0.0),
            release: release.max(0.0),
            length: length.max(0.0),
        }
    }

    /// Gain at `t` seconds after the segment start
    ///
    /// Zero outside `[0, length)`.
    #[inline]
    pub fn gain_at(&self, t: f64) -> f32 {
        if !(0.0..self.length).contains(&t) {
            return 0.0;
        }
        let rise = if self.attack > 0.0 {
            (t / self.attack).min(1.0)
        } else {
            1.0
        };
        let fall = if self.release > 0.0 {
            ((self.length - t) / self.release).min(1.0)
        } else {
            1.0
        };
        rise.min(fall).clamp(0.0, 1.0) as f32
    }

    /// Length of the hold-at-unity plateau (zero when the ramps overlap)
    pub fn plateau(&self) -> f64 {
        (self.length - self.attack - self.release).max(0.0)
    }
}

/// Revocable reference to a segment accepted by an output graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentHandle(pub u64);

impl fmt::Display for SegmentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment#{}", self.0)
    }
}

/// A segment bound to a buffer and an absolute output-clock start time
#[derive(Debug, Clone)]
pub struct ScheduledSegment {
    /// Track the samples belong to
    pub track_id: TrackId,
    /// Decoded samples
    pub buffer: Arc<AudioBuffer>,
    /// Absolute clock time (seconds) at which output starts
    pub start_time: f64,
    /// Offset into the track where output starts
    pub intra_track_start: f64,
    /// How long the segment plays
    pub play_length: f64,
    /// Gain envelope, relative to `start_time`
    pub envelope: FadeEnvelope,
}

impl ScheduledSegment {
    /// Absolute clock time at which the segment falls silent
    pub fn end_time(&self) -> f64 {
        self.start_time + self.play_length
    }

    /// Whether the segment produces output at absolute time `time`
    pub fn is_active_at(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}
