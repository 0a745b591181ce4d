//! Timeline index
//!
//! Pure mapping between a global timeline offset and a (track, intra-track
//! offset) pair. Nothing here is cached: every call walks the slice it is
//! given, so results always reflect the catalog's current contents.

use segue_core::Track;
use serde::{Deserialize, Serialize};

/// A point inside one track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Catalog index of the track
    pub track_index: usize,
    /// Seconds into that track
    pub intra_track_offset: f64,
}

/// Sum of all track durations
pub fn total_duration(tracks: &[Track]) -> f64 {
    tracks.iter().map(Track::duration_seconds).sum()
}

/// Find the track covering `position`
///
/// Returns `None` when `position >= total_duration` (past the end).
/// Negative or NaN positions are treated as 0. Zero-length tracks never
/// cover any position and are skipped.
pub fn locate(tracks: &[Track], position: f64) -> Option<Location> {
    let position = if position.is_nan() { 0.0 } else { position.max(0.0) };
    if position >= total_duration(tracks) {
        return None;
    }

    let mut cursor = position;
    for (track_index, track) in tracks.iter().enumerate() {
        let duration = track.duration_seconds();
        if cursor < duration {
            return Some(Location {
                track_index,
                intra_track_offset: cursor,
            });
        }
        cursor -= duration;
    }

    // Rounding left the cursor a hair past the last track.
    tracks
        .iter()
        .rposition(|t| t.duration_seconds() > 0.0)
        .map(|track_index| Location {
            track_index,
            intra_track_offset: tracks[track_index].duration_seconds(),
        })
}

/// Timeline offset at which track `index` starts
///
/// `index == tracks.len()` yields the total duration; anything larger is `None`.
pub fn track_start(tracks: &[Track], index: usize) -> Option<f64> {
    if index > tracks.len() {
        return None;
    }
    Some(total_duration(&tracks[..index]))
}

/// Inverse of `locate`
pub fn position_of(tracks: &[Track], location: Location) -> Option<f64> {
    if location.track_index >= tracks.len() {
        return None;
    }
    track_start(tracks, location.track_index).map(|start| start + location.intra_track_offset)
}
