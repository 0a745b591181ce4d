//! Subcommand implementations
pub mod plan;
pub mod render;

use segue_audio::{load_files, SymphoniaDecodeService};
use segue_core::TrackId;
use segue_playback::Catalog;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::error::{CliError, Result};

/// An input left out of the catalog
#[derive(Debug, Clone, Serialize)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub error: String,
}

/// The file a catalog track was decoded from
#[derive(Debug, Clone, Serialize)]
pub struct TrackSource {
    pub track_id: TrackId,
    pub path: PathBuf,
}

/// Decoded inputs ready for planning or playback
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    /// One entry per catalog track, in catalog order
    pub sources: Vec<TrackSource>,
    pub skipped: Vec<SkippedInput>,
}

/// Decode every file and build the catalog in input order
///
/// A file listed more than once becomes one track per listing. Fails only
/// when nothing could be decoded.
pub fn load_catalog(files: &[PathBuf]) -> Result<LoadedCatalog> {
    let service = SymphoniaDecodeService::new();
    let mut tracks = Vec::with_capacity(files.len());
    let mut sources = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for (path, result) in load_files(&service, files) {
        match result {
            Ok(track) => {
                sources.push(TrackSource {
                    track_id: track.id().clone(),
                    path,
                });
                tracks.push(track);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping input");
                skipped.push(SkippedInput {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    if tracks.is_empty() {
        return Err(CliError::NoTracks(files.len()));
    }
    Ok(LoadedCatalog {
        catalog: Catalog::from_tracks(tracks)?,
        sources,
        skipped,
    })
}
