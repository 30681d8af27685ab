use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Submission archive error type.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("io error at '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("entry '{entry}' escapes the extraction root")]
    PathTraversal { entry: String },

    #[error("archive has more than {limit} entries")]
    TooManyEntries { limit: usize },

    #[error("entry '{entry}' exceeds the per-entry limit of {limit} bytes")]
    EntryTooLarge { entry: String, limit: u64 },

    #[error("archive exceeds the total uncompressed limit of {limit} bytes")]
    TotalTooLarge { limit: u64 },

    #[error("entry '{entry}' is neither a regular file nor a directory")]
    UnsupportedEntryType { entry: String },

    #[error("malformed archive: {0}")]
    MalformedArchive(String),
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::MalformedArchive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
