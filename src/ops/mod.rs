pub mod chat;
pub mod chunk;
pub mod listing;
pub mod sandbox;

use thiserror::Error;

/// Failure modes of the sandboxed file-read pipeline.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("path '{0}' escapes the configured root")]
    OutOfRoot(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("'{0}' is a directory, not a file")]
    NotAFile(String),
    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    UnsupportedFormat(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
