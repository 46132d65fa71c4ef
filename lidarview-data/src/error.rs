//! Error types for scan decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a point-cloud file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Truncated point data: expected {expected} bytes, found {actual}")]
    TruncatedData { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
