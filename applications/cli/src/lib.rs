//! Segue CLI Library
//!
//! Plans and renders crossfaded timelines from audio files.
//!
//! This library exposes the command implementations for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::plan::{plan, PlanReport};
pub use commands::render::{render, RenderRequest, RenderSummary, StopReason};
pub use config::{RenderSettings, SegueConfig};
pub use error::{CliError, Result};
