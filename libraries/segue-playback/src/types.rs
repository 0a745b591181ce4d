//! Core types for the playback scheduler

use segue_core::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportStatus {
    /// Nothing scheduled; position frozen (0 after `stop`, the total after a natural end)
    #[default]
    Stopped,

    /// Segments scheduled; position derived from the clock anchor
    Playing,

    /// Nothing scheduled; position frozen where playback was paused
    Paused,
}

/// Configuration for the transport and planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Overlap between adjacent tracks, in seconds (0 = gapless)
    pub crossfade_seconds: f64,

    /// Fade-in applied at the start of every segment to avoid a click (default: 30 ms)
    pub attack_seconds: f64,

    /// Lead time added when scheduling so nothing lands in the past (default: 50 ms)
    pub safety_margin_seconds: f64,

    /// Position poller period in milliseconds (default: 100)
    pub poll_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            crossfade_seconds: 4.0,
            attack_seconds: 0.03,
            safety_margin_seconds: 0.05,
            poll_interval_ms: 100,
        }
    }
}

impl PlaybackConfig {
    /// Gapless settings: no overlap between tracks
    pub fn gapless() -> Self {
        Self {
            crossfade_seconds: 0.0,
            ..Self::default()
        }
    }

    /// Default settings with a specific crossfade length
    pub fn with_crossfade(seconds: f64) -> Self {
        Self {
            crossfade_seconds: seconds,
            ..Self::default()
        }
    }

    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject negative, non-finite or zero-period settings
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("crossfade_seconds", self.crossfade_seconds),
            ("attack_seconds", self.attack_seconds),
            ("safety_margin_seconds", self.safety_margin_seconds),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PlaybackError::InvalidConfig(format!(
                    "{name} must be a finite value >= 0, got {value}"
                )));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(PlaybackError::InvalidConfig(
                "poll_interval_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of the transport, published by the position poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Transport state
    pub status: TransportStatus,

    /// Timeline position in seconds
    pub position: f64,

    /// Sum of all track durations
    pub total_duration: f64,

    /// Track under the position (none past the end)
    pub track_id: Option<TrackId>,

    /// Catalog index of that track
    pub track_index: Option<usize>,

    /// Offset into that track
    pub intra_track_offset: f64,

    /// Seconds until the sleep timer fires, if armed
    pub sleep_remaining: Option<f64>,
}

impl PositionSnapshot {
    /// The end-of-timeline predicate: playing and at or past the total
    pub fn is_finished(&self) -> bool {
        self.status == TransportStatus::Playing && self.position >= self.total_duration
    }
}
