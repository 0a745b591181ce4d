/// Core error types for Segue
use thiserror::Error;

/// Result type alias using `SegueError`
pub type Result<T> = std::result::Result<T, SegueError>;

/// Core error type shared by collaborators
#[derive(Error, Debug)]
pub enum SegueError {
    /// Decoding failed for one input
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The output graph refused or failed an operation
    #[error("Output error: {0}")]
    Output(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SegueError {
    /// Create an output error
    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Failure reported by a `DecodeService` for a single input
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Container or codec not recognised
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Recognised but damaged data
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// The container holds no decodable audio track
    #[error("No audio track found")]
    NoAudioTrack,

    /// I/O error while reading the input
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
