use std::path::PathBuf;
use thiserror::Error;

/// Session-level failures. Per-frame anomalies never surface here.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to acquire frame source: {0}")]
    AcquisitionFailure(#[from] SourceError),
}

/// Failures of a frame source while it is being opened
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed recording at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("Recording {} holds no frames", .0.display())]
    Empty(PathBuf),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
