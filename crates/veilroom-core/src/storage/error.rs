//! Storage error types.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// Any of these aborts the operation with no partial write; the caller
/// surfaces the failure and the user decides whether to resubmit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Underlying storage engine failure (file system, database).
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Persisted bytes could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),

    /// The remote store endpoint failed or returned an error status.
    #[error("remote store error: {0}")]
    Remote(String),
}
