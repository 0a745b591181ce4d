//! Transport - the playback driver
//!
//! Owns the catalog, the output graph and the clock. Each public operation
//! computes the next `TransportState` with the pure state machine and
//! performs the matching side effect on the output graph:
//!
//! - `play`/`seek` cancel every segment of the previous run *before*
//!   scheduling the new plan, so old and new segments are never pending
//!   together.
//! - `pause`/`stop`/natural end cancel the run and disarm the sleep timer.
//! - An output failure cancels whatever was scheduled and falls back to
//!   `Stopped`.
//!
//! Nothing here blocks on audio hardware; operations return as soon as the
//! segments are handed to the output graph.

use segue_core::{Clock, OutputGraph, SegmentHandle, Track, TrackId};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::planner::{PlaybackSegment, SegmentPlanner};
use crate::sleep::SleepTimer;
use crate::state::{clamp_position, TransportEvent, TransportState};
use crate::timeline::{self, Location};
use crate::types::{PlaybackConfig, PositionSnapshot, TransportStatus};

/// Transport shared between a control thread and the position poller
pub type SharedTransport = Arc<Mutex<Transport>>;

/// A segment accepted by the output graph for the current run
#[derive(Debug, Clone)]
struct ActiveSegment {
    handle: SegmentHandle,
    segment: PlaybackSegment,
    /// Absolute clock time the run was anchored at
    run_start: f64,
}

impl ActiveSegment {
    fn is_active_at(&self, now: f64) -> bool {
        now >= self.run_start + self.segment.output_offset
            && now < self.run_start + self.segment.output_end()
    }
}

/// Timeline playback scheduler
pub struct Transport {
    catalog: Catalog,
    output: Box<dyn OutputGraph>,
    clock: Arc<dyn Clock>,
    config: PlaybackConfig,
    state: TransportState,
    /// Segments of the current run, in plan order
    scheduled: Vec<ActiveSegment>,
    sleep: SleepTimer,
    pending_events: Vec<PlaybackEvent>,
}

impl Transport {
    /// Create a stopped transport with an empty catalog
    pub fn new(
        output: Box<dyn OutputGraph>,
        clock: Arc<dyn Clock>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            catalog: Catalog::new(),
            output,
            clock,
            config,
            state: TransportState::new(),
            scheduled: Vec::new(),
            sleep: SleepTimer::new(),
            pending_events: Vec::new(),
        }
    }

    /// Create a stopped transport over an existing catalog
    pub fn with_catalog(
        catalog: Catalog,
        output: Box<dyn OutputGraph>,
        clock: Arc<dyn Clock>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            catalog,
            ..Self::new(output, clock, config)
        }
    }

    /// Wrap in `Arc<Mutex<_>>` for sharing with the poller
    pub fn into_shared(self) -> SharedTransport {
        Arc::new(Mutex::new(self))
    }

    // ===== Queries =====

    /// Current transport state
    pub fn status(&self) -> TransportStatus {
        self.state.status()
    }

    /// Full timing state (status and anchor)
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Reading of the transport clock
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Timeline position; derived from the anchor while playing, frozen otherwise
    pub fn current_position(&self) -> f64 {
        self.state
            .position(self.clock.now(), self.catalog.total_duration())
    }

    /// Sum of all track durations
    pub fn total_duration(&self) -> f64 {
        self.catalog.total_duration()
    }

    /// End-of-timeline predicate: playing and at or past the total
    pub fn is_finished(&self) -> bool {
        self.status() == TransportStatus::Playing
            && self.current_position() >= self.total_duration()
    }

    /// Track and offset under the current position
    pub fn current_location(&self) -> Option<Location> {
        timeline::locate(self.catalog.tracks(), self.current_position())
    }

    /// Track under the current position
    pub fn current_track(&self) -> Option<&Track> {
        self.current_location()
            .and_then(|loc| self.catalog.get(loc.track_index))
    }

    /// Segments handed to the output graph for the current run
    pub fn scheduled_segments(&self) -> Vec<&PlaybackSegment> {
        self.scheduled.iter().map(|active| &active.segment).collect()
    }

    /// The track catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Change the crossfade length; takes effect on the next `play`/`seek`
    pub fn set_crossfade(&mut self, seconds: f64) {
        self.config.crossfade_seconds = seconds.max(0.0);
    }

    /// Point-in-time view for listeners
    pub fn snapshot(&self) -> PositionSnapshot {
        let now = self.clock.now();
        let total = self.catalog.total_duration();
        let position = self.state.position(now, total);
        let location = timeline::locate(self.catalog.tracks(), position);
        PositionSnapshot {
            status: self.state.status(),
            position,
            total_duration: total,
            track_id: location
                .and_then(|loc| self.catalog.get(loc.track_index))
                .map(|t| t.id().clone()),
            track_index: location.map(|loc| loc.track_index),
            intra_track_offset: location.map_or(0.0, |loc| loc.intra_track_offset),
            sleep_remaining: self.sleep.remaining(now),
        }
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Playback Control =====

    /// Start playback at `from`
    ///
    /// Valid from any state. Returns `Ok(false)` without doing anything when
    /// the catalog is empty. `from` is clamped to the timeline; a stopped
    /// transport asked to play at or past the end starts over from 0.
    pub fn play(&mut self, from: f64) -> Result<bool> {
        if self.catalog.is_empty() {
            debug!("play ignored: catalog is empty");
            return Ok(false);
        }

        let previous = self.state.status();
        let total = self.catalog.total_duration();
        let from = self.state.resolve_start(from, total);

        // The previous run must be fully gone before anything new is queued.
        self.cancel_scheduled();

        let now = self.clock.now();
        let run_start = now + self.config.safety_margin_seconds;
        let plan = SegmentPlanner::from_config(&self.config).plan(self.catalog.tracks(), from);

        for segment in plan {
            let Some(track) = self.catalog.get(segment.track_index) else {
                continue;
            };
            let scheduled = segment.schedule_at(track, run_start);
            match self.output.schedule(scheduled) {
                Ok(handle) => self.scheduled.push(ActiveSegment {
                    handle,
                    segment,
                    run_start,
                }),
                Err(err) => return Err(self.fail_output(err.to_string(), from)),
            }
        }

        self.state = self.state.apply(TransportEvent::Start { from, now });
        debug!(
            from,
            run_start,
            segments = self.scheduled.len(),
            "transport playing"
        );
        if previous != TransportStatus::Playing {
            self.emit_state_changed();
        }
        Ok(true)
    }

    /// Play from the current (frozen) position
    pub fn resume(&mut self) -> Result<bool> {
        let position = self.current_position();
        self.play(position)
    }

    /// Freeze the position and silence output; no-op unless playing
    pub fn pause(&mut self) {
        if self.state.status() != TransportStatus::Playing {
            return;
        }
        let now = self.clock.now();
        let total = self.catalog.total_duration();

        self.cancel_scheduled();
        self.state = self.state.apply(TransportEvent::Pause { now, total });
        self.disarm_on_exit();
        debug!(position = self.current_position(), "transport paused");
        self.emit_state_changed();
    }

    /// Silence output and rewind to 0; idempotent
    pub fn stop(&mut self) {
        let was_stopped = self.state.status() == TransportStatus::Stopped;
        self.cancel_scheduled();
        self.state = self.state.apply(TransportEvent::Stop);
        self.disarm_on_exit();
        if !was_stopped {
            debug!("transport stopped");
            self.emit_state_changed();
        }
    }

    /// Move to `position` (clamped to the timeline)
    ///
    /// While playing this re-plans immediately from the new point; while
    /// paused or stopped it only moves the frozen position.
    pub fn seek(&mut self, position: f64) -> Result<()> {
        let target = clamp_position(position, self.catalog.total_duration());

        if self.state.status() == TransportStatus::Playing {
            self.play(target)?;
        } else {
            let now = self.clock.now();
            self.state = self.state.apply(TransportEvent::Seek {
                position: target,
                now,
            });
        }

        debug!(position = target, "transport seeked");
        self.pending_events
            .push(PlaybackEvent::Seeked { position: target });
        Ok(())
    }

    /// Drive time-based transitions: natural end, then the sleep deadline
    ///
    /// Called by the position poller. Returns the status afterwards.
    pub fn tick(&mut self) -> TransportStatus {
        if self.state.status() != TransportStatus::Playing {
            return self.state.status();
        }

        if self.is_finished() {
            self.finish();
        } else if self.sleep.take_due(self.clock.now()).is_some() {
            info!("sleep timer elapsed, stopping playback");
            self.pending_events.push(PlaybackEvent::SleepTimerFired);
            self.stop();
        }
        self.state.status()
    }

    /// Natural end: stopped, with the position left at the total
    fn finish(&mut self) {
        let total = self.catalog.total_duration();
        self.cancel_scheduled();
        self.state = self.state.apply(TransportEvent::Halt { position: total });
        self.disarm_on_exit();
        info!(total, "reached end of timeline");
        self.pending_events.push(PlaybackEvent::Finished {
            total_duration: total,
        });
        self.emit_state_changed();
    }

    // ===== Sleep Timer =====

    /// Stop playback `seconds` from now
    ///
    /// Only meaningful while playing: returns `false` and arms nothing
    /// otherwise. Re-arming replaces the previous deadline.
    pub fn arm_sleep_timer(&mut self, seconds: f64) -> bool {
        if self.state.status() != TransportStatus::Playing {
            debug!(seconds, "sleep timer not armed: transport is not playing");
            return false;
        }
        let id = self.sleep.arm(self.clock.now(), seconds);
        let duration_seconds = self.sleep.pending().map_or(0.0, |task| task.delay());
        debug!(task = %id, duration_seconds, "sleep timer armed");
        self.pending_events
            .push(PlaybackEvent::SleepTimerArmed { duration_seconds });
        true
    }

    /// Cancel the sleep timer
    pub fn disarm_sleep_timer(&mut self) {
        if let Some(task) = self.sleep.disarm() {
            debug!(task = %task.id(), "sleep timer disarmed");
        }
    }

    /// Seconds until the sleep timer fires, if armed
    pub fn sleep_remaining(&self) -> Option<f64> {
        self.sleep.remaining(self.clock.now())
    }

    // ===== Catalog =====

    /// Append a track
    pub fn add_track(&mut self, track: Track) -> Result<()> {
        self.edit_catalog(|catalog| catalog.push(track))
    }

    /// Insert a track at `index`
    pub fn insert_track(&mut self, index: usize, track: Track) -> Result<()> {
        self.edit_catalog(|catalog| catalog.insert(index, track))
    }

    /// Move the track at `from` to `to`
    ///
    /// Already-scheduled segments keep playing in the old order; the next
    /// `play`/`seek` plans from the new one.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        self.edit_catalog(|catalog| catalog.move_track(from, to))
    }

    /// Delete a track
    ///
    /// Refused with `TrackInUse` for the track under the position while
    /// playing or paused, and for any track whose segment is sounding right
    /// now (the incoming side of a crossfade). Any scheduled segment of the
    /// deleted track is released from the output graph.
    pub fn remove_track(&mut self, id: &TrackId) -> Result<Track> {
        if self.state.status() != TransportStatus::Stopped
            && self.current_track().is_some_and(|t| t.id() == id)
        {
            warn!(track_id = %id, "refusing to delete the track that is playing");
            return Err(PlaybackError::TrackInUse(id.clone()));
        }
        if self.is_sounding(id) {
            warn!(track_id = %id, "refusing to delete a track that is mid-crossfade");
            return Err(PlaybackError::TrackInUse(id.clone()));
        }

        let removed = self.edit_catalog(|catalog| catalog.remove(id))?;

        let output = &mut self.output;
        self.scheduled.retain(|active| {
            if &active.segment.track_id == id {
                output.release(active.handle);
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    /// Stop and remove every track
    pub fn clear_catalog(&mut self) {
        self.stop();
        self.catalog.clear();
        self.emit_catalog_changed();
    }

    /// Apply a catalog edit and keep the position on the same spot of the same track
    ///
    /// If the track under the position is gone, the position lands where it
    /// used to start; a position at the end of a non-empty timeline stays at
    /// the end. Always clamped to the new total.
    fn edit_catalog<T>(&mut self, edit: impl FnOnce(&mut Catalog) -> Result<T>) -> Result<T> {
        let now = self.clock.now();
        let old_total = self.catalog.total_duration();
        let position = self.state.position(now, old_total);
        let anchor = timeline::locate(self.catalog.tracks(), position).and_then(|loc| {
            self.catalog
                .get(loc.track_index)
                .map(|t| (t.id().clone(), loc.intra_track_offset, loc.track_index))
        });

        let value = edit(&mut self.catalog)?;

        let new_total = self.catalog.total_duration();
        let target = match anchor {
            Some((id, intra, old_index)) => match self.catalog.index_of(&id) {
                Some(index) => self.catalog.track_start(index).unwrap_or(0.0) + intra,
                None => self
                    .catalog
                    .track_start(old_index.min(self.catalog.len()))
                    .unwrap_or(new_total),
            },
            None if old_total > 0.0 => new_total,
            None => position,
        };
        let target = clamp_position(target, new_total);
        self.state = self.state.apply(TransportEvent::Retarget {
            position: target,
            now,
        });

        for active in &mut self.scheduled {
            if let Some(index) = self.catalog.index_of(&active.segment.track_id) {
                active.segment.track_index = index;
            }
        }

        self.emit_catalog_changed();
        Ok(value)
    }

    // ===== Internals =====

    /// Whether a scheduled segment of `id` is audible at the current clock time
    fn is_sounding(&self, id: &TrackId) -> bool {
        let now = self.clock.now();
        self.scheduled
            .iter()
            .any(|active| &active.segment.track_id == id && active.is_active_at(now))
    }

    fn cancel_scheduled(&mut self) {
        self.output.cancel_all();
        if !self.scheduled.is_empty() {
            debug!(count = self.scheduled.len(), "cancelled scheduled segments");
            self.scheduled.clear();
        }
    }

    /// Every way out of `Playing` disarms the sleep timer
    fn disarm_on_exit(&mut self) {
        if let Some(task) = self.sleep.disarm() {
            debug!(task = %task.id(), "sleep timer disarmed on leaving playback");
        }
    }

    /// Collaborator failure: silence everything and fall back to `Stopped`
    fn fail_output(&mut self, message: String, position: f64) -> PlaybackError {
        error!(error = %message, "output graph failed, stopping transport");
        let was_stopped = self.state.status() == TransportStatus::Stopped;
        self.cancel_scheduled();
        self.state = self.state.apply(TransportEvent::Halt { position });
        self.disarm_on_exit();
        self.pending_events.push(PlaybackEvent::Error {
            message: message.clone(),
        });
        if !was_stopped {
            self.emit_state_changed();
        }
        PlaybackError::Output(message)
    }

    fn emit_state_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::StateChanged {
            status: self.state.status(),
        });
    }

    fn emit_catalog_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::CatalogChanged {
            track_count: self.catalog.len(),
            total_duration: self.catalog.total_duration(),
        });
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("state", &self.state)
            .field("tracks", &self.catalog.len())
            .field("scheduled", &self.scheduled.len())
            .field("sleep", &self.sleep.pending())
            .finish_non_exhaustive()
    }
}
