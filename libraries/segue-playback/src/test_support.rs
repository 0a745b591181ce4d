//! Shared helpers for unit tests

use segue_core::{
    AudioBuffer, AudioFormat, ManualClock, OutputGraph, SampleRate, ScheduledSegment,
    SegmentHandle, SegueError, Track, TrackId,
};
use std::sync::{Arc, Mutex};

use crate::catalog::Catalog;
use crate::transport::Transport;
use crate::types::PlaybackConfig;

/// Track with the given duration and an empty buffer
pub(crate) fn track(id: &str, seconds: f64) -> Track {
    let buffer = AudioBuffer::new(Vec::new(), AudioFormat::float_stereo(SampleRate::CD_QUALITY));
    Track::new(TrackId::new(id), seconds, Arc::new(buffer))
}

/// A 10 s, B 8 s, C 5 s
pub(crate) fn abc() -> Vec<Track> {
    vec![track("a", 10.0), track("b", 8.0), track("c", 5.0)]
}

/// What the transport asked of the output graph, in order
#[derive(Debug, Default)]
pub(crate) struct OutputLog {
    pub scheduled: Vec<ScheduledSegment>,
    pub released: Vec<SegmentHandle>,
    pub cancel_calls: usize,
    /// Handles currently alive (scheduled and not revoked)
    pub live: Vec<SegmentHandle>,
    /// Fail every `schedule` call once set
    pub fail: bool,
}

/// Output graph that records every call into a shared log
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingOutput {
    pub log: Arc<Mutex<OutputLog>>,
    next: u64,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputGraph for RecordingOutput {
    fn schedule(&mut self, segment: ScheduledSegment) -> segue_core::Result<SegmentHandle> {
        let mut log = self.log.lock().unwrap();
        if log.fail {
            return Err(SegueError::output("device lost"));
        }
        self.next += 1;
        let handle = SegmentHandle(self.next);
        log.scheduled.push(segment);
        log.live.push(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: SegmentHandle) {
        let mut log = self.log.lock().unwrap();
        log.released.push(handle);
        log.live.retain(|h| *h != handle);
    }

    fn cancel_all(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.cancel_calls += 1;
        log.live.clear();
    }
}

/// Transport over A/B/C with a 4 s crossfade, plus its clock and output log
pub(crate) fn abc_transport() -> (Transport, ManualClock, Arc<Mutex<OutputLog>>) {
    let clock = ManualClock::new();
    let output = RecordingOutput::new();
    let log = Arc::clone(&output.log);
    let catalog = Catalog::from_tracks(abc()).unwrap();
    let transport = Transport::with_catalog(
        catalog,
        Box::new(output),
        Arc::new(clock.clone()),
        PlaybackConfig::default(),
    );
    (transport, clock, log)
}
