//! Track catalog
//!
//! The ordered list of tracks in playback order. Order is user-controlled
//! (insert, move) rather than insertion order, and ids are unique.

use segue_core::{Track, TrackId};

use crate::error::{PlaybackError, Result};
use crate::timeline;

/// Ordered, duplicate-free sequence of tracks
///
/// Owns no playback state. `total_duration` is recomputed from the tracks on
/// every call, so it can never go stale across a mutation.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Build a catalog, rejecting duplicate ids
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let mut catalog = Self::new();
        for track in tracks {
            catalog.push(track)?;
        }
        Ok(catalog)
    }

    /// All tracks in playback order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Iterate tracks in playback order
    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Current index of the track with `id`
    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == id)
    }

    /// Check whether a track with `id` is present
    pub fn contains(&self, id: &TrackId) -> bool {
        self.index_of(id).is_some()
    }

    /// Sum of all track durations
    pub fn total_duration(&self) -> f64 {
        timeline::total_duration(&self.tracks)
    }

    /// Timeline offset at which track `index` starts (`len()` gives the total)
    pub fn track_start(&self, index: usize) -> Option<f64> {
        timeline::track_start(&self.tracks, index)
    }

    /// Append a track
    pub fn push(&mut self, track: Track) -> Result<()> {
        self.ensure_unique(track.id())?;
        self.tracks.push(track);
        Ok(())
    }

    /// Insert a track at `index` (`index == len()` appends)
    pub fn insert(&mut self, index: usize, track: Track) -> Result<()> {
        if index > self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.ensure_unique(track.id())?;
        self.tracks.insert(index, track);
        Ok(())
    }

    /// Remove the track with `id`
    pub fn remove(&mut self, id: &TrackId) -> Result<Track> {
        let index = self
            .index_of(id)
            .ok_or_else(|| PlaybackError::TrackNotFound(id.clone()))?;
        Ok(self.tracks.remove(index))
    }

    /// Move the track at `from` so it ends up at `to`
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if from != to {
            let track = self.tracks.remove(from);
            self.tracks.insert(to, track);
        }
        Ok(())
    }

    /// Remove every track
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    fn ensure_unique(&self, id: &TrackId) -> Result<()> {
        if self.contains(id) {
            return Err(PlaybackError::DuplicateTrack(id.clone()));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{abc, track};

    fn ids(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|t| t.id().as_str()).collect()
    }

    #[test]
    fn total_tracks_every_mutation() {
        let mut catalog = Catalog::from_tracks(abc()).unwrap();
        assert_eq!(catalog.total_duration(), 23.0);

        catalog.push(track("d", 2.0)).unwrap();
        assert_eq!(catalog.total_duration(), 25.0);

        catalog.remove(&TrackId::new("b")).unwrap();
        assert_eq!(catalog.total_duration(), 17.0);

        catalog.move_track(0, 2).unwrap();
        assert_eq!(catalog.total_duration(), 17.0);

        catalog.clear();
        assert_eq!(catalog.total_duration(), 0.0);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut catalog = Catalog::from_tracks(abc()).unwrap();
        let err = catalog.push(track("a", 1.0)).unwrap_err();
        assert!(matches!(err, PlaybackError::DuplicateTrack(id) if id.as_str() == "a"));

        assert!(Catalog::from_tracks(vec![track("x", 1.0), track("x", 2.0)]).is_err());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn insert_and_move_reorder() {
        let mut catalog = Catalog::from_tracks(abc()).unwrap();

        catalog.insert(1, track("z", 1.0)).unwrap();
        assert_eq!(ids(&catalog), vec!["a", "z", "b", "c"]);

        catalog.move_track(3, 0).unwrap();
        assert_eq!(ids(&catalog), vec!["c", "a", "z", "b"]);
        assert_eq!(catalog.track_start(2), Some(15.0));

        assert!(matches!(
            catalog.insert(9, track("q", 1.0)),
            Err(PlaybackError::IndexOutOfBounds(9))
        ));
        assert!(matches!(
            catalog.move_track(0, 4),
            Err(PlaybackError::IndexOutOfBounds(4))
        ));
    }

    #[test]
    fn remove_unknown_track() {
        let mut catalog = Catalog::from_tracks(abc()).unwrap();
        let err = catalog.remove(&TrackId::new("nope")).unwrap_err();
        assert!(matches!(err, PlaybackError::TrackNotFound(_)));
    }
}
