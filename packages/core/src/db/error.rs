//! Relation Repository Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Relation repository errors
///
/// Surfaced to the caller as-is; the repository never recovers locally.
#[derive(Error, Debug)]
pub enum RelationLookupError {
    /// Failed to read or write the backing store
    #[error("Failed to access relation repository at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored relations could not be decoded
    #[error("Relation repository at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Relations could not be encoded for storage
    #[error("Failed to encode relations: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RelationLookupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}
