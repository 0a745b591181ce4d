//! Error types for the playback scheduler

use segue_core::{SegueError, TrackId};
use thiserror::Error;

/// Playback errors
///
/// Everything here is recoverable: the transport is left in a well-defined
/// state whenever one of these is returned.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Tried to delete the track under the current position while it is playing or paused
    #[error("Track is in use: {0}")]
    TrackInUse(TrackId),

    /// A track with this id is already in the catalog
    #[error("Duplicate track id: {0}")]
    DuplicateTrack(TrackId),

    /// No track with this id
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// The output graph failed; the transport fell back to `Stopped`
    #[error("Output error: {0}")]
    Output(String),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<SegueError> for PlaybackError {
    fn from(err: SegueError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
