//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for skinrt_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => skinrt_core::Error::Io(e),
            IoError::FileNotFound { path } => skinrt_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )),
            IoError::InvalidFormat { format } => skinrt_core::Error::UnsupportedFormat(format),
            other => skinrt_core::Error::InvalidData(other.to_string()),
        }
    }
}
