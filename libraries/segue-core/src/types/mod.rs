//! Domain types for Segue

mod audio;
mod ids;
mod segment;
mod track;

pub use audio::{AudioBuffer, AudioFormat, DecodedAudio, SampleRate};
pub use ids::TrackId;
pub use segment::{FadeEnvelope, ScheduledSegment, SegmentHandle};
pub use track::Track;
