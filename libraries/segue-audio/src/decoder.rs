//! Decode service implementation using Symphonia
use segue_core::{AudioBuffer, AudioFormat, DecodeError, DecodeService, DecodedAudio, SampleRate};
use std::io::Cursor;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Fallback when the container does not declare a rate
const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// ITU-R BS.775-1 coefficient for center and surround channels (-3 dB)
const CENTER_MIX: f32 = 0.707;

/// Decode service using Symphonia
///
/// Supports: MP3, FLAC, OGG/Vorbis, WAV, AAC/M4A
///
/// Always produces interleaved stereo f32 in `[-1.0, 1.0]`: mono is
/// duplicated to both sides, anything wider is downmixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecodeService;

impl SymphoniaDecodeService {
    /// Create a new decode service
    pub fn new() -> Self {
        Self
    }

    /// Extensions accepted as probe hints
    pub fn supports_extension(ext: &str) -> bool {
        matches!(
            ext.to_lowercase().as_str(),
            "mp3" | "flac" | "ogg" | "oga" | "wav" | "m4a" | "aac"
        )
    }

    /// Convert one decoded packet to interleaved stereo
    fn convert_buffer(decoded: AudioBufferRef<'_>, output: &mut Vec<f32>) {
        let channels = decoded.spec().channels.count();

        // Symmetric scaling for signed integers: divide by 2^(N-1)
        match decoded {
            AudioBufferRef::F32(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| s.clamp(-1.0, 1.0));
            }
            AudioBufferRef::F64(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| (s as f32).clamp(-1.0, 1.0));
            }
            AudioBufferRef::S32(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| s as f32 / 2_147_483_648.0);
            }
            AudioBufferRef::S24(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| {
                    s.inner() as f32 / 8_388_608.0
                });
            }
            AudioBufferRef::S16(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| f32::from(s) / 32_768.0);
            }
            AudioBufferRef::S8(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| f32::from(s) / 128.0);
            }
            AudioBufferRef::U32(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| {
                    (s as f32 / u32::MAX as f32) * 2.0 - 1.0
                });
            }
            AudioBufferRef::U24(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| {
                    (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0
                });
            }
            AudioBufferRef::U16(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| {
                    (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0
                });
            }
            AudioBufferRef::U8(buf) => {
                Self::downmix_to_stereo(&buf, channels, output, |s| {
                    (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0
                });
            }
        }
    }

    /// Append `buf` to `output` as interleaved stereo
    ///
    /// Layouts past stereo follow ITU-R BS.775-1:
    /// - L_out = L + 0.707*C + 0.707*Ls
    /// - R_out = R + 0.707*C + 0.707*Rs
    ///
    /// LFE is dropped.
    fn downmix_to_stereo<T, F>(
        buf: &symphonia::core::audio::AudioBuffer<T>,
        channels: usize,
        output: &mut Vec<f32>,
        normalize: F,
    ) where
        T: symphonia::core::sample::Sample + Copy,
        F: Fn(T) -> f32,
    {
        let frames = buf.frames();
        output.reserve(frames * 2);

        match channels {
            0 => output.resize(output.len() + frames * 2, 0.0),
            1 => {
                for &s in &buf.chan(0)[..frames] {
                    let sample = normalize(s);
                    output.push(sample);
                    output.push(sample);
                }
            }
            2 => {
                for (&l, &r) in buf.chan(0).iter().zip(buf.chan(1)).take(frames) {
                    output.push(normalize(l));
                    output.push(normalize(r));
                }
            }
            _ => {
                // (L, R, C), (L, R, Ls, Rs), (L, R, C, Ls, Rs), (L, R, C, LFE, Ls, Rs, ...)
                let (center, surround) = match channels {
                    3 => (Some(2), None),
                    4 => (None, Some((2, 3))),
                    5 => (Some(2), Some((3, 4))),
                    _ => (Some(2), Some((4, 5))),
                };
                let frame_pairs = buf.chan(0).iter().zip(buf.chan(1)).take(frames);
                for (i, (&l, &r)) in frame_pairs.enumerate() {
                    let c = center.map_or(0.0, |ch| normalize(buf.chan(ch)[i]) * CENTER_MIX);
                    let (sl, sr) = surround.map_or((0.0, 0.0), |(left, right)| {
                        (
                            normalize(buf.chan(left)[i]) * CENTER_MIX,
                            normalize(buf.chan(right)[i]) * CENTER_MIX,
                        )
                    });
                    output.push((normalize(l) + c + sl).clamp(-1.0, 1.0));
                    output.push((normalize(r) + c + sr).clamp(-1.0, 1.0));
                }
            }
        }
    }
}

impl DecodeService for SymphoniaDecodeService {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &probe_hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                SymphoniaError::IoError(io) => DecodeError::Io(io),
                other => DecodeError::UnsupportedFormat(other.to_string()),
            })?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;

        let sample_rate = track.codec_params.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

        let mut samples = Vec::new();
        let mut skipped_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => Self::convert_buffer(decoded, &mut samples),
                Err(SymphoniaError::DecodeError(e)) => {
                    // Recoverable: a damaged packet, keep going
                    skipped_packets += 1;
                    debug!(error = %e, "skipping undecodable packet");
                }
                Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
            }
        }

        if skipped_packets > 0 {
            warn!(skipped_packets, "decoded with damaged packets");
        }
        if samples.is_empty() {
            return Err(DecodeError::Corrupt("no audio frames decoded".to_string()));
        }

        let format = AudioFormat::float_stereo(SampleRate::new(sample_rate));
        let decoded = DecodedAudio::from_buffer(AudioBuffer::new(samples, format));
        debug!(
            sample_rate,
            duration_seconds = decoded.duration_seconds,
            "decoded audio"
        );
        Ok(decoded)
    }
}
