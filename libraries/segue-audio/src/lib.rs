//! Segue Audio - decode and render collaborators
//!
//! Implementations of the `segue-core` collaborator traits:
//! - `SymphoniaDecodeService`: `DecodeService` backed by Symphonia
//! - `load_batch` / `load_files`: per-input decoding that never aborts a batch
//! - `MixRenderer`: offline `OutputGraph` rendering scheduled segments to
//!   interleaved stereo on a virtual clock
//!
//! # Example
//!
//! ```rust
//! use segue_audio::MixRenderer;
//! use segue_core::{Clock, SampleRate};
//!
//! let mut renderer = MixRenderer::new(SampleRate::DVD_QUALITY);
//! let silence = renderer.render_seconds(0.25);
//!
//! assert_eq!(silence.len(), 12_000 * 2);
//! assert!((renderer.clock().now() - 0.25).abs() < 1e-9);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod decoder;
pub mod render;

pub use batch::{load_batch, load_files, BatchInput, BatchItem};
pub use decoder::SymphoniaDecodeService;
pub use render::MixRenderer;
