//! Error types for skinrt

use thiserror::Error;

use crate::version::FormatVersion;

/// Main error type for skinrt operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Version mismatch in {path}: expected {expected}, found {found}")]
    VersionMismatch {
        path: String,
        expected: FormatVersion,
        found: FormatVersion,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("{count} skinning discrepancies found")]
    Discrepancies { count: usize },
}

/// Result type alias for skinrt operations
pub type Result<T> = std::result::Result<T, Error>;
