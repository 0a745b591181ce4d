//! Batch loading
//!
//! Decodes many inputs independently. A failure is reported for that input
//! only; the rest of the batch still loads.

use segue_core::{DecodeError, DecodeService, Track, TrackId};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One encoded input waiting to be decoded
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Id the decoded track will carry
    pub id: TrackId,
    /// Encoded file contents
    pub bytes: Vec<u8>,
    /// File extension used as a probe hint
    pub hint: Option<String>,
}

impl BatchInput {
    /// Input from bytes already in memory
    pub fn new(id: TrackId, bytes: Vec<u8>, hint: Option<String>) -> Self {
        Self { id, bytes, hint }
    }
}

/// Outcome for one input, in input order
#[derive(Debug)]
pub struct BatchItem {
    /// Id the input was submitted with
    pub id: TrackId,
    /// Decoded track or the reason it could not be decoded
    pub result: Result<Track, DecodeError>,
}

/// Decode every input, keeping per-input failures
pub fn load_batch<S>(service: &S, inputs: Vec<BatchInput>) -> Vec<BatchItem>
where
    S: DecodeService + ?Sized,
{
    let total = inputs.len();
    let items: Vec<BatchItem> = inputs
        .into_iter()
        .map(|input| {
            let result = service
                .decode(&input.bytes, input.hint.as_deref())
                .map(|decoded| Track::from_decoded(input.id.clone(), decoded));
            if let Err(e) = &result {
                warn!(track_id = %input.id, error = %e, "failed to decode input");
            }
            BatchItem {
                id: input.id,
                result,
            }
        })
        .collect();

    let loaded = items.iter().filter(|item| item.result.is_ok()).count();
    info!(loaded, failed = total - loaded, "batch decode finished");
    items
}

/// Read and decode files
///
/// Every path gets a freshly generated track id, so the same file listed twice
/// loads as two distinct tracks. Unreadable files are reported as
/// `DecodeError::Io` for that file.
pub fn load_files<S, P>(service: &S, paths: &[P]) -> Vec<(PathBuf, Result<Track, DecodeError>)>
where
    S: DecodeService + ?Sized,
    P: AsRef<Path>,
{
    let mut results = Vec::with_capacity(paths.len());
    let mut inputs = Vec::with_capacity(paths.len());
    let mut slots = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref().to_path_buf();
        match std::fs::read(&path) {
            Ok(bytes) => {
                let hint = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase);
                let id = TrackId::generate();
                debug!(path = %path.display(), track_id = %id, "read input");
                inputs.push(BatchInput::new(id, bytes, hint));
                slots.push((path, None));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read input");
                slots.push((path, Some(DecodeError::Io(e))));
            }
        }
    }

    let mut decoded = load_batch(service, inputs).into_iter();
    for (path, read_error) in slots {
        let result = match read_error {
            Some(err) => Err(err),
            None => match decoded.next() {
                Some(item) => item.result,
                None => Err(DecodeError::Corrupt(format!(
                    "missing decode result for {}",
                    path.display()
                ))),
            },
        };
        results.push((path, result));
    }
    results
}
