/// Track record owned by the catalog
use super::audio::{AudioBuffer, DecodedAudio};
use super::ids::TrackId;
use std::sync::Arc;

/// One decoded clip in the playback order
///
/// Immutable once created. Cloning is cheap: the sample data sits behind an
/// `Arc` and is shared with every segment scheduled from this track.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    duration_seconds: f64,
    buffer: Arc<AudioBuffer>,
}

impl Track {
    /// Create a track with an explicit duration
    ///
    /// Negative or non-finite durations are stored as zero.
    pub fn new(id: TrackId, duration_seconds: f64, buffer: Arc<AudioBuffer>) -> Self {
        let duration_seconds = if duration_seconds.is_finite() {
            duration_seconds.max(0.0)
        } else {
            0.0
        };
        Self {
            id,
            duration_seconds,
            buffer,
        }
    }

    /// Create a track whose duration is the buffer's length
    pub fn from_buffer(id: TrackId, buffer: Arc<AudioBuffer>) -> Self {
        let duration = buffer.duration_secs();
        Self::new(id, duration, buffer)
    }

    /// Create a track from a decode result
    pub fn from_decoded(id: TrackId, decoded: DecodedAudio) -> Self {
        Self::new(id, decoded.duration_seconds, decoded.buffer)
    }

    /// Track identifier
    pub fn id(&self) -> &TrackId {
        &self.id
    }

    /// Duration in seconds (always >= 0)
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Shared handle to the decoded samples
    pub fn buffer(&self) -> &Arc<AudioBuffer> {
        &self.buffer
    }
}
