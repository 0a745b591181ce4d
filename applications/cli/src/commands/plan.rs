//! `segue plan`: print the segment plan for a set of files
use segue_playback::{PlaybackSegment, SegmentPlanner};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::{load_catalog, SkippedInput, TrackSource};
use crate::config::SegueConfig;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub total_duration: f64,
    pub crossfade_seconds: f64,
    pub from: f64,
    pub segments: Vec<PlaybackSegment>,
    pub sources: Vec<TrackSource>,
    pub skipped: Vec<SkippedInput>,
}

pub fn plan(files: &[PathBuf], from: f64, config: &SegueConfig) -> Result<PlanReport> {
    let loaded = load_catalog(files)?;
    let catalog = &loaded.catalog;
    let total_duration = catalog.total_duration();
    let from = segue_playback::clamp_position(from, total_duration);

    let segments = SegmentPlanner::from_config(&config.playback).plan(catalog.tracks(), from);
    info!(
        tracks = catalog.len(),
        segments = segments.len(),
        total_duration,
        "planned timeline"
    );

    Ok(PlanReport {
        total_duration,
        crossfade_seconds: config.playback.crossfade_seconds,
        from,
        segments,
        sources: loaded.sources,
        skipped: loaded.skipped,
    })
}
