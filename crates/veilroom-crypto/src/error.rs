//! Cipher error types.

use thiserror::Error;

/// Errors from sealing or opening message blobs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// The AEAD backend rejected the encryption inputs.
    #[error("failed to encrypt message")]
    Encryption,

    /// The blob could not be opened with the provided key.
    ///
    /// Covers malformed base64, a blob shorter than the nonce, and a
    /// failed authentication tag. The variant carries no detail: a caller
    /// must not be able to tell a wrong key from corrupted data.
    #[error("failed to decrypt message")]
    Decryption,
}
