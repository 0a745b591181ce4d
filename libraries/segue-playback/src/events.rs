//! Playback events
//!
//! Queued by the transport at each observable change and drained by the host
//! (UI, visualizer, CLI) with `Transport::drain_events`.

use serde::{Deserialize, Serialize};

use crate::types::TransportStatus;

/// Events emitted by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        status: TransportStatus,
    },

    /// Position jumped (seek or play from an explicit offset)
    Seeked {
        /// New timeline position
        position: f64,
    },

    /// Playback reached the end of the timeline on its own
    Finished {
        /// Timeline length at the time it finished
        total_duration: f64,
    },

    /// Sleep timer armed or re-armed
    SleepTimerArmed {
        /// Seconds until it fires
        duration_seconds: f64,
    },

    /// Sleep timer fired and stopped playback
    SleepTimerFired,

    /// Tracks were added, removed or reordered
    CatalogChanged {
        /// New number of tracks
        track_count: usize,
        /// New timeline length
        total_duration: f64,
    },

    /// A collaborator failed; the transport is stopped
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_tag() {
        let event = PlaybackEvent::StateChanged {
            status: TransportStatus::Paused,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"StateChanged":{"status":"Paused"}}"#);
    }
}
