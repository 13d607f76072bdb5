use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the entry store and the day selector.
#[derive(Debug, Error)]
pub enum DiaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not an entry file name: {0}")]
    CorruptName(String),
    #[error("cannot format date: {0}")]
    Format(#[from] time::error::Format),
    #[error("no other days to choose from")]
    NoCandidateDays,
}

impl DiaryError {
    /// Maps an I/O error on `path` to `NotFound` when the file is missing.
    pub(crate) fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DiaryError::NotFound(path.into())
        } else {
            DiaryError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, DiaryError>;
