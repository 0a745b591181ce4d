//! Segue Playback - Timeline Playback Scheduler
//!
//! Plays an ordered catalog of decoded tracks as one continuous timeline,
//! with adjacent tracks overlapping by a configurable crossfade.
//!
//! This crate provides:
//! - Track catalog with stable ids and a derived timeline
//! - Timeline index (position ⇄ track + intra-track offset)
//! - Crossfade segment planner
//! - Transport state machine (Stopped / Playing / Paused)
//! - Sleep timer
//! - Position poller (tokio)
//!
//! # Architecture
//!
//! The scheduler never renders audio itself. It hands `ScheduledSegment`s to
//! an `OutputGraph` and reads time from a `Clock`, both defined in
//! `segue-core`. A virtual `ManualClock` makes every timing rule testable
//! without real time passing.
//!
//! # Example
//!
//! ```rust
//! use segue_core::{
//!     AudioBuffer, AudioFormat, ManualClock, OutputGraph, SampleRate, ScheduledSegment,
//!     SegmentHandle, Track, TrackId,
//! };
//! use segue_playback::{Catalog, PlaybackConfig, Transport, TransportStatus};
//! use std::sync::Arc;
//!
//! struct NullOutput(u64);
//!
//! impl OutputGraph for NullOutput {
//!     fn schedule(&mut self, _segment: ScheduledSegment) -> segue_core::Result<SegmentHandle> {
//!         self.0 += 1;
//!         Ok(SegmentHandle(self.0))
//!     }
//!     fn release(&mut self, _handle: SegmentHandle) {}
//!     fn cancel_all(&mut self) {}
//! }
//!
//! let silence = Arc::new(AudioBuffer::new(Vec::new(), AudioFormat::float_stereo(SampleRate::CD_QUALITY)));
//! let catalog = Catalog::from_tracks(vec![
//!     Track::new(TrackId::new("a"), 10.0, silence.clone()),
//!     Track::new(TrackId::new("b"), 8.0, silence),
//! ])?;
//!
//! let clock = ManualClock::new();
//! let mut transport = Transport::with_catalog(
//!     catalog,
//!     Box::new(NullOutput(0)),
//!     Arc::new(clock.clone()),
//!     PlaybackConfig::default(),
//! );
//!
//! transport.play(0.0)?;
//! clock.advance(3.0);
//! assert_eq!(transport.status(), TransportStatus::Playing);
//! assert!((transport.current_position() - 3.0).abs() < 1e-9);
//! # Ok::<(), segue_playback::PlaybackError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod events;
pub mod planner;
pub mod poller;
pub mod sleep;
pub mod state;
pub mod task;
pub mod timeline;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use catalog::Catalog;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use planner::{PlaybackSegment, SegmentPlanner};
pub use poller::{spawn_position_poller, PollerHandle, PositionPoller};
pub use sleep::SleepTimer;
pub use state::{clamp_position, TransportEvent, TransportState};
pub use task::{ScheduledTask, TaskId};
pub use timeline::Location;
pub use transport::{SharedTransport, Transport};
pub use types::{PlaybackConfig, PositionSnapshot, TransportStatus};
