//! Error taxonomy shared by `store` and the `cask` facade.
use thiserror::Error;

/// Errors produced anywhere in the storage path: the append writer, the
/// positioned reader, the data/hint files, the index, and the facade that
/// sits on top of them.
#[derive(Debug, Error)]
pub enum CaskError {
    /// The requested key has no live record.
    #[error("key not found")]
    NotFound,

    /// A caller-supplied key or value violated a length constraint.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A read returned fewer bytes than the caller's contract required.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Number of bytes the caller expected to read.
        expected: usize,
        /// Number of bytes actually read.
        actual: usize,
    },

    /// An internal invariant was violated (e.g. an index entry pointing at
    /// an unregistered file-id).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<format::FormatError> for CaskError {
    fn from(e: format::FormatError) -> Self {
        CaskError::InvalidArgument {
            reason: e.to_string(),
        }
    }
}

/// Convenience alias used throughout `store` and `cask`.
pub type Result<T> = std::result::Result<T, CaskError>;
