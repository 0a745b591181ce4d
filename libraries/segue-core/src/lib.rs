//! Segue Core
//!
//! Platform-agnostic types and collaborator traits shared by every Segue crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `AudioBuffer`, `FadeEnvelope`, `ScheduledSegment`
//! - **Collaborator Traits**: `Clock`, `DecodeService`, `OutputGraph`
//! - **Error Handling**: `SegueError`, `DecodeError` and the `Result` alias
//!
//! The scheduler never touches raw bytes or audio hardware; decoding and
//! rendering sit behind the traits defined here.
//!
//! # Example
//!
//! ```rust
//! use segue_core::{AudioBuffer, AudioFormat, SampleRate, Track, TrackId};
//! use std::sync::Arc;
//!
//! let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, 32);
//! let buffer = Arc::new(AudioBuffer::new(vec![0.0; 88_200], format));
//! let track = Track::from_buffer(TrackId::new("intro"), buffer);
//!
//! assert!((track.duration_seconds() - 1.0).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DecodeError, Result, SegueError};
pub use traits::{DecodeService, OutputGraph};
pub use types::{
    AudioBuffer, AudioFormat, DecodedAudio, FadeEnvelope, SampleRate, ScheduledSegment,
    SegmentHandle, Track, TrackId,
};
