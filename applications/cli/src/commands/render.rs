//! `segue render`: play files through the transport into a WAV file
//!
//! The transport runs against the renderer's virtual clock, so the whole
//! timeline renders as fast as the CPU allows while every timing rule
//! (crossfades, sleep timer, natural end) behaves as in real time.

use hound::{SampleFormat, WavSpec, WavWriter};
use segue_audio::MixRenderer;
use segue_core::SampleRate;
use segue_playback::{PlaybackEvent, PositionPoller, Transport, TransportStatus};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::load_catalog;
use crate::config::SegueConfig;
use crate::error::Result;

/// Extra rendered time allowed past the timeline before giving up
const OVERRUN_SECONDS: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub files: Vec<PathBuf>,
    pub out: PathBuf,
    pub from: f64,
    pub sleep: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Reached the end of the timeline
    Finished,
    /// Sleep timer fired
    SleepTimer,
    /// Rendered past the timeline without the transport stopping
    Overrun,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    pub output: PathBuf,
    pub tracks: usize,
    pub skipped: usize,
    pub sample_rate: u32,
    pub rendered_seconds: f64,
    pub final_position: f64,
    pub stop_reason: StopReason,
}

pub fn render(request: &RenderRequest, config: &SegueConfig) -> Result<RenderSummary> {
    let loaded = load_catalog(&request.files)?;
    let track_count = loaded.catalog.len();

    let sample_rate = config.render.sample_rate;
    let renderer = Arc::new(Mutex::new(MixRenderer::new(SampleRate::new(sample_rate))));
    let clock = lock(&renderer).clock();

    let mut transport = Transport::with_catalog(
        loaded.catalog,
        Box::new(renderer.clone()),
        Arc::new(clock),
        config.playback.clone(),
    );
    let total = transport.total_duration();

    transport.play(request.from)?;
    if let Some(seconds) = request.sleep {
        transport.arm_sleep_timer(seconds);
    }

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&request.out, spec)?;
    let mut block = vec![0.0f32; config.render.block_frames * 2];
    let mut poller = PositionPoller::from_config(&config.playback);
    let limit = (total - transport.current_position()).max(0.0) + OVERRUN_SECONDS;
    let started = transport.now();

    let stop_reason = loop {
        lock(&renderer).render(&mut block);
        for sample in &block {
            writer.write_sample(*sample)?;
        }

        if let Some(snapshot) = poller.poll(&mut transport) {
            debug!(
                position = snapshot.position,
                track_index = ?snapshot.track_index,
                "render progress"
            );
            if snapshot.status == TransportStatus::Stopped {
                let fired = transport
                    .drain_events()
                    .iter()
                    .any(|e| matches!(e, PlaybackEvent::SleepTimerFired));
                break if fired {
                    StopReason::SleepTimer
                } else {
                    StopReason::Finished
                };
            }
        }

        if transport.now() - started > limit {
            transport.stop();
            break StopReason::Overrun;
        }
    };

    writer.finalize()?;

    let summary = RenderSummary {
        output: request.out.clone(),
        tracks: track_count,
        skipped: loaded.skipped.len(),
        sample_rate,
        rendered_seconds: transport.now() - started,
        final_position: transport.current_position(),
        stop_reason,
    };
    info!(
        output = %summary.output.display(),
        rendered_seconds = summary.rendered_seconds,
        stop_reason = ?summary.stop_reason,
        "render complete"
    );
    Ok(summary)
}

fn lock(renderer: &Mutex<MixRenderer>) -> std::sync::MutexGuard<'_, MixRenderer> {
    renderer.lock().unwrap_or_else(PoisonError::into_inner)
}
