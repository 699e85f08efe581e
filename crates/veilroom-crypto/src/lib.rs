//! Veilroom cryptographic primitives.
//!
//! Message bodies are sealed end-to-end with a symmetric key shared
//! out-of-band; the server only ever sees opaque blobs. The scheme is a
//! single AEAD pass per message:
//!
//! ```text
//! Passphrase (raw bytes, truncated/zero-padded to 32)
//!        │
//!        ▼
//! ChaCha20-Poly1305 + fresh random 12-byte nonce
//!        │
//!        ▼
//! base64( nonce ‖ ciphertext ‖ tag )  →  Message content
//! ```
//!
//! The blob is self-describing: the first 12 decoded bytes are the nonce,
//! the remainder is ciphertext plus tag. Opening a blob with the wrong key
//! and opening a corrupted blob fail identically.
//!
//! # Security
//!
//! - Authenticated encryption: tampering with any blob byte fails the tag
//!   check and the message is rejected.
//! - Fresh random nonce per seal: identical plaintexts produce distinct
//!   blobs.
//! - No key stretching is applied. Raw passphrase bytes become key
//!   material, so key strength is exactly passphrase strength. This is a
//!   documented trade-off of the capability-link sharing model, preserved
//!   rather than silently hardened.
//! - No forward secrecy and no key rotation: one static key per room.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod error;

pub use cipher::{KEY_SIZE, NONCE_SIZE, RoomKey, decrypt_message, encrypt_message, seal_with_nonce};
pub use error::CryptoError;
