//! Collaborator traits the scheduler consumes
use crate::error::{DecodeError, Result};
use crate::types::{DecodedAudio, ScheduledSegment, SegmentHandle};
use std::sync::{Arc, Mutex, PoisonError};

/// Decode service
///
/// Turns raw encoded bytes into a finished buffer. The scheduler never sees
/// raw bytes, only the `Track` records built from these results.
pub trait DecodeService: Send + Sync {
    /// Decode a complete file held in memory
    ///
    /// `hint` is an optional file extension ("mp3", "flac", ...) used to
    /// speed up format probing.
    ///
    /// # Errors
    /// Returns `DecodeError` for unsupported or corrupt input
    fn decode(
        &self,
        bytes: &[u8],
        hint: Option<&str>,
    ) -> std::result::Result<DecodedAudio, DecodeError>;
}

/// Output graph
///
/// Accepts segments ahead of time and renders them on its own clock.
/// Envelope ramps must be applied relative to each segment's own start, not
/// to the caller's wall clock.
pub trait OutputGraph: Send {
    /// Queue one segment for output at its absolute `start_time`
    ///
    /// # Errors
    /// Returns an error if the output cannot accept the segment
    fn schedule(&mut self, segment: ScheduledSegment) -> Result<SegmentHandle>;

    /// Revoke a single segment, silencing it immediately if already sounding
    fn release(&mut self, handle: SegmentHandle);

    /// Revoke every pending and in-flight segment
    fn cancel_all(&mut self);
}

/// A shared output graph, so the owner of the scheduler and the code pulling
/// audio out of the graph (a render loop, a device callback) can both reach it
impl<T: OutputGraph> OutputGraph for Arc<Mutex<T>> {
    fn schedule(&mut self, segment: ScheduledSegment) -> Result<SegmentHandle> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .schedule(segment)
    }

    fn release(&mut self, handle: SegmentHandle) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release(handle);
    }

    fn cancel_all(&mut self) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel_all();
    }
}
