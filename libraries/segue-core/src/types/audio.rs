/// Audio-related types
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// 44.1 kHz
    pub const CD_QUALITY: Self = Self(44_100);
    /// 48 kHz
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bits per sample
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// 32-bit float stereo at the given rate (the decoder's output format)
    pub fn float_stereo(sample_rate: SampleRate) -> Self {
        Self::new(sample_rate, 2, 32)
    }
}

/// Audio buffer containing decoded samples
///
/// Samples are stored as f32 in the range [-1.0, 1.0]
/// Interleaved format: [L, R, L, R, ...] for stereo
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        match self.format.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match self.format.sample_rate.as_hz() {
            0 => 0.0,
            rate => self.frames() as f64 / rate as f64,
        }
    }

    /// Read one frame as a stereo pair
    ///
    /// Mono is duplicated to both sides; channels past the second are ignored.
    /// Returns `None` past the end of the buffer.
    #[inline]
    pub fn stereo_frame(&self, frame: usize) -> Option<(f32, f32)> {
        let channels = self.format.channels as usize;
        if channels == 0 || frame >= self.frames() {
            return None;
        }
        let base = frame * channels;
        let left = self.samples[base];
        let right = if channels > 1 {
            self.samples[base + 1]
        } else {
            left
        };
        Some((left, right))
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Output of a `DecodeService`: a shared buffer plus its duration
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Decoded samples, shared with every segment that plays them
    pub buffer: Arc<AudioBuffer>,

    /// Playable duration in seconds
    pub duration_seconds: f64,
}

impl DecodedAudio {
    /// Wrap a buffer, deriving the duration from its frame count
    pub fn from_buffer(buffer: AudioBuffer) -> Self {
        let duration_seconds = buffer.duration_secs();
        Self {
            buffer: Arc::new(buffer),
            duration_seconds,
        }
    }
}
