//! Property-based tests for the playback scheduler
//!
//! Uses proptest to check timeline, planner and transport invariants over
//! random catalogs and random operation sequences.

use proptest::prelude::*;
use segue_core::{
    AudioBuffer, AudioFormat, ManualClock, OutputGraph, SampleRate, ScheduledSegment,
    SegmentHandle, Track, TrackId,
};
use segue_playback::{
    clamp_position, timeline, Catalog, PlaybackConfig, SegmentPlanner, Transport,
    TransportStatus,
};
use std::sync::{Arc, Mutex};

// ===== Helpers =====

fn tracks_from(durations: &[f64]) -> Vec<Track> {
    let format = AudioFormat::float_stereo(SampleRate::CD_QUALITY);
    let buffer = Arc::new(AudioBuffer::new(Vec::new(), format));
    durations
        .iter()
        .enumerate()
        .map(|(i, d)| Track::new(TrackId::new(format!("t{i}")), *d, buffer.clone()))
        .collect()
}

fn arbitrary_durations() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.5f64..600.0, 1..20)
}

/// Counts live handles so overlapping runs would show up
#[derive(Debug, Clone, Default)]
struct CountingOutput {
    live: Arc<Mutex<Vec<SegmentHandle>>>,
    next: u64,
}

impl OutputGraph for CountingOutput {
    fn schedule(&mut self, _segment: ScheduledSegment) -> segue_core::Result<SegmentHandle> {
        self.next += 1;
        let handle = SegmentHandle(self.next);
        self.live.lock().unwrap().push(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: SegmentHandle) {
        self.live.lock().unwrap().retain(|h| *h != handle);
    }

    fn cancel_all(&mut self) {
        self.live.lock().unwrap().clear();
    }
}

#[derive(Debug, Clone)]
enum Op {
    Play(f64),
    Pause,
    Resume,
    Stop,
    Seek(f64),
    Advance(f64),
    Tick,
    ArmSleep(f64),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-10.0f64..2000.0).prop_map(Op::Play),
        Just(Op::Pause),
        Just(Op::Resume),
        Just(Op::Stop),
        (-10.0f64..2000.0).prop_map(Op::Seek),
        (0.0f64..120.0).prop_map(Op::Advance),
        Just(Op::Tick),
        (0.0f64..60.0).prop_map(Op::ArmSleep),
    ]
}

fn apply(transport: &mut Transport, clock: &ManualClock, op: Op) {
    match op {
        Op::Play(from) => {
            transport.play(from).unwrap();
        }
        Op::Pause => transport.pause(),
        Op::Resume => {
            transport.resume().unwrap();
        }
        Op::Stop => transport.stop(),
        Op::Seek(position) => transport.seek(position).unwrap(),
        Op::Advance(seconds) => clock.advance(seconds),
        Op::Tick => {
            transport.tick();
        }
        Op::ArmSleep(seconds) => {
            transport.arm_sleep_timer(seconds);
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: the track and offset found for a position add back up to it
    #[test]
    fn locate_is_consistent_with_track_starts(
        durations in arbitrary_durations(),
        fraction in 0.0f64..1.0,
    ) {
        let tracks = tracks_from(&durations);
        let total = timeline::total_duration(&tracks);
        let position = total * fraction;

        let location = timeline::locate(&tracks, position).unwrap();
        let start = timeline::track_start(&tracks, location.track_index).unwrap();

        prop_assert!(location.intra_track_offset >= 0.0);
        prop_assert!(location.intra_track_offset <= durations[location.track_index] + 1e-9);
        prop_assert!((start + location.intra_track_offset - position).abs() < 1e-6);
    }

    /// Property: nothing is located at or past the end
    #[test]
    fn locate_past_end_is_none(durations in arbitrary_durations(), extra in 0.0f64..100.0) {
        let tracks = tracks_from(&durations);
        let total = timeline::total_duration(&tracks);
        prop_assert!(timeline::locate(&tracks, total + extra).is_none());
    }

    /// Property: planned segments advance by play_length - crossfade, never backwards
    #[test]
    fn plan_offsets_follow_the_crossfade(
        durations in arbitrary_durations(),
        crossfade in 0.0f64..12.0,
        fraction in 0.0f64..1.0,
    ) {
        let tracks = tracks_from(&durations);
        let start = timeline::total_duration(&tracks) * fraction;
        let plan = SegmentPlanner::new(crossfade, 0.03).plan(&tracks, start);

        prop_assert!(!plan.is_empty());
        prop_assert!(plan[0].output_offset.abs() < 1e-12);
        for pair in plan.windows(2) {
            let expected = pair[0].output_offset + (pair[0].play_length - crossfade).max(0.0);
            prop_assert!((pair[1].output_offset - expected).abs() < 1e-6);
            prop_assert!(pair[1].intra_track_start.abs() < 1e-12);
            prop_assert_eq!(pair[1].track_index, pair[0].track_index + 1);
        }
        for segment in &plan {
            prop_assert!(segment.play_length > 0.0);
            prop_assert!((segment.fade_out_length - crossfade).abs() < 1e-12);
        }
    }

    /// Property: clamping lands inside the timeline
    #[test]
    fn clamp_stays_in_range(position in proptest::num::f64::ANY, total in 0.0f64..10_000.0) {
        let clamped = clamp_position(position, total);
        prop_assert!((0.0..=total).contains(&clamped));
    }

    /// Property: random operation sequences keep the transport consistent
    #[test]
    fn transport_invariants_hold(
        durations in prop::collection::vec(1.0f64..60.0, 1..8),
        ops in prop::collection::vec(arbitrary_op(), 1..60),
    ) {
        let clock = ManualClock::new();
        let output = CountingOutput::default();
        let live = Arc::clone(&output.live);
        let catalog = Catalog::from_tracks(tracks_from(&durations)).unwrap();
        let mut transport = Transport::with_catalog(
            catalog,
            Box::new(output),
            Arc::new(clock.clone()),
            PlaybackConfig::default(),
        );
        let total = transport.total_duration();

        for op in ops {
            apply(&mut transport, &clock, op);

            let position = transport.current_position();
            prop_assert!((0.0..=total).contains(&position));

            let live_count = live.lock().unwrap().len();
            match transport.status() {
                TransportStatus::Playing => {
                    prop_assert_eq!(live_count, transport.scheduled_segments().len());
                }
                TransportStatus::Paused | TransportStatus::Stopped => {
                    prop_assert_eq!(live_count, 0);
                    prop_assert!(transport.sleep_remaining().is_none());
                }
            }
        }
    }

    /// Property: seek(p), pause(), currentPosition() == p from any prior state
    #[test]
    fn seek_then_pause_round_trips(
        durations in prop::collection::vec(1.0f64..60.0, 1..8),
        prior in prop::collection::vec(arbitrary_op(), 0..10),
        fraction in 0.0f64..=1.0,
    ) {
        let clock = ManualClock::new();
        let catalog = Catalog::from_tracks(tracks_from(&durations)).unwrap();
        let mut transport = Transport::with_catalog(
            catalog,
            Box::new(CountingOutput::default()),
            Arc::new(clock.clone()),
            PlaybackConfig::default(),
        );
        for op in prior {
            apply(&mut transport, &clock, op);
        }

        let target = transport.total_duration() * fraction;
        transport.seek(target).unwrap();
        transport.pause();

        prop_assert!((transport.current_position() - target).abs() < 1e-9);
    }

    /// Property: a second stop() changes nothing
    #[test]
    fn stop_is_idempotent(
        durations in prop::collection::vec(1.0f64..60.0, 1..8),
        prior in prop::collection::vec(arbitrary_op(), 0..20),
    ) {
        let clock = ManualClock::new();
        let catalog = Catalog::from_tracks(tracks_from(&durations)).unwrap();
        let mut transport = Transport::with_catalog(
            catalog,
            Box::new(CountingOutput::default()),
            Arc::new(clock.clone()),
            PlaybackConfig::default(),
        );
        for op in prior {
            apply(&mut transport, &clock, op);
        }

        transport.stop();
        let once = (transport.state(), transport.snapshot());
        transport.drain_events();
        transport.stop();

        prop_assert_eq!((transport.state(), transport.snapshot()), once);
        prop_assert!(transport.drain_events().is_empty());
    }
}
