//! Offline mix renderer
//!
//! An `OutputGraph` that renders scheduled segments into an interleaved
//! stereo buffer instead of a sound card. It owns the virtual clock the
//! transport reads, and every `render` call advances that clock by exactly
//! the rendered duration, so the transport sees time pass at the speed
//! audio is produced.

use segue_core::{
    Clock, ManualClock, OutputGraph, Result, SampleRate, ScheduledSegment, SegmentHandle,
    SegueError,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Offline `OutputGraph` driven by its own `ManualClock`
#[derive(Debug)]
pub struct MixRenderer {
    sample_rate: SampleRate,
    clock: ManualClock,
    segments: BTreeMap<SegmentHandle, ScheduledSegment>,
    next_handle: u64,
}

impl MixRenderer {
    /// Renderer at `sample_rate`, starting at clock time 0
    pub fn new(sample_rate: SampleRate) -> Self {
        Self::with_clock(sample_rate, ManualClock::new())
    }

    /// Renderer sharing an existing clock
    pub fn with_clock(sample_rate: SampleRate, clock: ManualClock) -> Self {
        Self {
            sample_rate,
            clock,
            segments: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Handle to the clock this renderer advances
    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Segments still pending or sounding
    pub fn active_segments(&self) -> usize {
        self.segments.len()
    }

    /// Render `out.len() / 2` stereo frames and advance the clock
    ///
    /// Each segment contributes `sample * envelope.gain_at(t - start_time)`
    /// while active; overlapping segments are summed and the mix is clamped
    /// to `[-1.0, 1.0]`. A trailing odd sample is left silent.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let rate = f64::from(self.sample_rate.as_hz());
        let frames = out.len() / 2;
        if frames == 0 || rate <= 0.0 {
            return;
        }

        let block_start = self.clock.now();
        let block_end = block_start + frames as f64 / rate;

        for segment in self.segments.values() {
            if segment.end_time() <= block_start || segment.start_time >= block_end {
                continue;
            }
            mix_segment(segment, block_start, rate, &mut out[..frames * 2]);
        }

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }

        let before = self.segments.len();
        self.segments.retain(|_, segment| segment.end_time() > block_end);
        if self.segments.len() != before {
            trace!(finished = before - self.segments.len(), "segments finished");
        }

        self.clock.set(block_end);
    }

    /// Render `seconds` of output into a new buffer
    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds.max(0.0) * f64::from(self.sample_rate.as_hz())).round() as usize;
        let mut out = vec![0.0; frames * 2];
        self.render(&mut out);
        out
    }
}

/// Add one segment's contribution to an interleaved stereo block
fn mix_segment(segment: &ScheduledSegment, block_start: f64, rate: f64, out: &mut [f32]) {
    let source_rate = f64::from(segment.buffer.format.sample_rate.as_hz());
    if source_rate <= 0.0 {
        return;
    }

    for (frame, pair) in out.chunks_exact_mut(2).enumerate() {
        let t = block_start + frame as f64 / rate;
        if !segment.is_active_at(t) {
            continue;
        }
        let local = t - segment.start_time;
        let gain = segment.envelope.gain_at(local);
        if gain == 0.0 {
            continue;
        }

        // Nearest source frame; no resampling between rates
        let source_frame = ((segment.intra_track_start + local) * source_rate).floor();
        if source_frame < 0.0 {
            continue;
        }
        if let Some((left, right)) = segment.buffer.stereo_frame(source_frame as usize) {
            pair[0] += left * gain;
            pair[1] += right * gain;
        }
    }
}

impl OutputGraph for MixRenderer {
    fn schedule(&mut self, segment: ScheduledSegment) -> Result<SegmentHandle> {
        if !segment.start_time.is_finite() || !segment.play_length.is_finite() {
            return Err(SegueError::invalid_input(format!(
                "segment for {} has non-finite timing",
                segment.track_id
            )));
        }
        if segment.start_time < self.clock.now() {
            debug!(
                track_id = %segment.track_id,
                late_by = self.clock.now() - segment.start_time,
                "segment scheduled in the past, its head is lost"
            );
        }

        self.next_handle += 1;
        let handle = SegmentHandle(self.next_handle);
        trace!(
            %handle,
            track_id = %segment.track_id,
            start = segment.start_time,
            "segment scheduled"
        );
        self.segments.insert(handle, segment);
        Ok(handle)
    }

    fn release(&mut self, handle: SegmentHandle) {
        if self.segments.remove(&handle).is_some() {
            trace!(%handle, "segment released");
        }
    }

    fn cancel_all(&mut self) {
        if !self.segments.is_empty() {
            debug!(count = self.segments.len(), "cancelling all segments");
        }
        self.segments.clear();
    }
}
