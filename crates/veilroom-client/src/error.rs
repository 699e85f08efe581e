//! Client error types.

use thiserror::Error;
use veilroom_core::{StorageError, ValidationError};
use veilroom_crypto::CryptoError;

/// Failures surfaced by a room session to the presentation layer.
///
/// Validation failures happen before any I/O. Storage and crypto failures
/// abort the operation with no partial write and are additionally reported
/// through the session's notification sink; none of them ever terminates
/// the session or its poll loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Input rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store failed; the operation was aborted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cipher failed; the send was aborted.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
