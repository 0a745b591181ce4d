//! Crossfade segment planner
//!
//! Turns a starting timeline offset into the ordered list of per-track
//! segments for one playback run. Adjacent segments overlap by the
//! crossfade length: the output cursor advances by `play_length - crossfade`
//! rather than by `play_length`.
//!
//! ```text
//! output time ─────────────────────────────────────────────▶
//! A |■■■■■■■■■■■■■■■■■■■■■■■■■■■▇▆▅▄▃▂▁|
//! B                          |▁▂■■■■■■■■■■■■■■■■■■■▇▆▅▄▃▂▁|
//!                            └─ crossfade ─┘
//! ```

use segue_core::{FadeEnvelope, ScheduledSegment, Track, TrackId};
use serde::{Deserialize, Serialize};

use crate::timeline;
use crate::types::PlaybackConfig;

/// One track's playback window within a run, in relative output time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSegment {
    /// Catalog index at planning time
    pub track_index: usize,

    /// Stable id of the track
    pub track_id: TrackId,

    /// Offset into the track where playback starts
    pub intra_track_start: f64,

    /// How long this segment plays (to the end of the track)
    pub play_length: f64,

    /// Fade-in length (the fixed attack window)
    pub fade_in_length: f64,

    /// Fade-out length (the crossfade)
    pub fade_out_length: f64,

    /// Seconds from the run's start at which this segment begins
    pub output_offset: f64,
}

impl PlaybackSegment {
    /// Relative output time at which this segment ends
    pub fn output_end(&self) -> f64 {
        self.output_offset + self.play_length
    }

    /// Gain envelope relative to the segment's own start
    pub fn envelope(&self) -> FadeEnvelope {
        FadeEnvelope::new(self.fade_in_length, self.fade_out_length, self.play_length)
    }

    /// Bind to `track`'s buffer at absolute time `run_start + output_offset`
    pub fn schedule_at(&self, track: &Track, run_start: f64) -> ScheduledSegment {
        ScheduledSegment {
            track_id: self.track_id.clone(),
            buffer: track.buffer().clone(),
            start_time: run_start + self.output_offset,
            intra_track_start: self.intra_track_start,
            play_length: self.play_length,
            envelope: self.envelope(),
        }
    }
}

/// Crossfade segment planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlanner {
    crossfade: f64,
    attack: f64,
}

impl SegmentPlanner {
    /// Planner with explicit crossfade and attack lengths (negatives become 0)
    pub fn new(crossfade_seconds: f64, attack_seconds: f64) -> Self {
        Self {
            crossfade: crossfade_seconds.max(0.0),
            attack: attack_seconds.max(0.0),
        }
    }

    /// Planner matching a playback configuration
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.crossfade_seconds, config.attack_seconds)
    }

    /// Crossfade length in seconds
    pub fn crossfade(&self) -> f64 {
        self.crossfade
    }

    /// Attack length in seconds
    pub fn attack(&self) -> f64 {
        self.attack
    }

    /// Plan a run starting at timeline offset `start`
    ///
    /// The first segment starts at `start`'s intra-track offset; every later
    /// track plays from its beginning. Each segment plays to the end of its
    /// track. Fade shapes are never shortened for short tracks: when
    /// `play_length < attack + crossfade` the ramps simply overlap. The
    /// output cursor never moves backwards, so a segment shorter than the
    /// crossfade makes the next one start together with it.
    ///
    /// Returns an empty plan when `start` is at or past the end.
    pub fn plan(&self, tracks: &[Track], start: f64) -> Vec<PlaybackSegment> {
        let Some(first) = timeline::locate(tracks, start) else {
            return Vec::new();
        };

        let mut segments = Vec::with_capacity(tracks.len() - first.track_index);
        let mut output_cursor = 0.0;
        let mut intra = first.intra_track_offset;

        for (track_index, track) in tracks.iter().enumerate().skip(first.track_index) {
            let intra_track_start = intra;
            let play_length = track.duration_seconds() - intra_track_start;
            intra = 0.0;
            if play_length <= 0.0 {
                continue;
            }

            segments.push(PlaybackSegment {
                track_index,
                track_id: track.id().clone(),
                intra_track_start,
                play_length,
                fade_in_length: self.attack,
                fade_out_length: self.crossfade,
                output_offset: output_cursor,
            });

            output_cursor += (play_length - self.crossfade).max(0.0);
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{abc, track};

    const ATTACK: f64 = 0.03;

    fn planner() -> SegmentPlanner {
        SegmentPlanner::new(4.0, ATTACK)
    }

    #[test]
    fn plans_overlapping_segments_from_start() {
        let plan = planner().plan(&abc(), 0.0);
        let offsets: Vec<f64> = plan.iter().map(|s| s.output_offset).collect();
        assert_eq!(offsets, vec![0.0, 6.0, 10.0]);

        let lengths: Vec<f64> = plan.iter().map(|s| s.play_length).collect();
        assert_eq!(lengths, vec![10.0, 8.0, 5.0]);
    }

    #[test]
    fn adjacent_segments_overlap_by_crossfade() {
        let plan = planner().plan(&abc(), 0.0);
        let (a, b) = (&plan[0], &plan[1]);

        assert_eq!(a.fade_out_length, 4.0);
        assert_eq!(b.fade_in_length, ATTACK);
        assert_eq!(a.output_end() - b.output_offset, 4.0);
    }

    #[test]
    fn first_and_last_segments_keep_their_fades() {
        let plan = planner().plan(&abc(), 0.0);
        assert_eq!(plan[0].fade_in_length, ATTACK);
        assert_eq!(plan[2].fade_out_length, 4.0);
    }

    #[test]
    fn mid_track_start_plays_the_remainder() {
        let plan = planner().plan(&abc(), 9.0);

        let a = &plan[0];
        assert_eq!(a.track_id.as_str(), "a");
        assert_eq!(a.intra_track_start, 9.0);
        assert_eq!(a.play_length, 1.0);
        assert_eq!(a.fade_in_length, ATTACK);

        // Remainder shorter than the crossfade: B comes in alongside A
        let b = &plan[1];
        assert_eq!(b.intra_track_start, 0.0);
        assert_eq!(b.output_offset, 0.0);
        assert_eq!(plan[2].output_offset, 4.0);
    }

    #[test]
    fn start_on_later_track() {
        let plan = planner().plan(&abc(), 12.0);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].track_index, 1);
        assert_eq!(plan[0].intra_track_start, 2.0);
        assert_eq!(plan[0].play_length, 6.0);
        assert_eq!(plan[1].output_offset, 2.0);
    }

    #[test]
    fn past_end_or_empty_plans_nothing() {
        assert!(planner().plan(&abc(), 23.0).is_empty());
        assert!(planner().plan(&[], 0.0).is_empty());
    }

    #[test]
    fn zero_length_tracks_are_skipped() {
        let tracks = vec![track("a", 6.0), track("gap", 0.0), track("b", 6.0)];
        let plan = planner().plan(&tracks, 0.0);
        let ids: Vec<&str> = plan.iter().map(|s| s.track_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(plan[1].output_offset, 2.0);
    }

    #[test]
    fn gapless_plan_abuts_segments() {
        let plan = SegmentPlanner::new(0.0, ATTACK).plan(&abc(), 0.0);
        assert_eq!(plan[1].output_offset, 10.0);
        assert_eq!(plan[2].output_offset, 18.0);
        assert_eq!(plan[0].fade_out_length, 0.0);
    }

    #[test]
    fn short_track_envelope_is_not_renormalized() {
        let tracks = vec![track("short", 5.0)];
        let plan = planner().plan(&tracks, 0.0);
        let envelope = plan[0].envelope();

        assert_eq!(envelope.release, 4.0);
        assert_eq!(envelope.attack, ATTACK);
        assert!((envelope.plateau() - 0.97).abs() < 1e-9);
    }

    #[test]
    fn schedule_at_adds_run_start() {
        let tracks = abc();
        let plan = planner().plan(&tracks, 0.0);
        let scheduled = plan[1].schedule_at(&tracks[1], 100.05);

        assert!((scheduled.start_time - 106.05).abs() < 1e-9);
        assert_eq!(scheduled.track_id.as_str(), "b");
        assert_eq!(scheduled.envelope.release, 4.0);
    }
}
