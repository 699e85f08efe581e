//! `ChaCha20-Poly1305` sealing of room messages.
//!
//! Blob layout: base64( nonce[12] ‖ ciphertext ‖ tag[16] ).

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// AEAD key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Nonce length prepended to every blob.
pub const NONCE_SIZE: usize = 12;

/// Symmetric room key held only in client memory.
///
/// Built from the passphrase distributed via the share link. Raw passphrase
/// bytes are used directly as key material, truncated or zero-padded to
/// [`KEY_SIZE`]; no stretching is applied, so a short passphrase yields a
/// weak key. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RoomKey([u8; KEY_SIZE]);

impl RoomKey {
    /// Build a key from the shared passphrase.
    ///
    /// Bytes beyond [`KEY_SIZE`] are ignored; shorter passphrases are
    /// zero-padded.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut key = [0u8; KEY_SIZE];
        let bytes = passphrase.as_bytes();
        let len = bytes.len().min(KEY_SIZE);
        key[..len].copy_from_slice(&bytes[..len]);
        Self(key)
    }
}

// Key material must never reach logs.
impl std::fmt::Debug for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RoomKey(..)")
    }
}

/// Encrypt a message, sampling a fresh random nonce from the OS RNG.
///
/// Produces the self-describing blob consumed by [`decrypt_message`].
/// Identical plaintexts yield distinct blobs.
pub fn encrypt_message(plaintext: &str, key: &RoomKey) -> Result<String, CryptoError> {
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    seal_with_nonce(plaintext, key, nonce.into())
}

/// Encrypt with a caller-provided nonce.
///
/// Pure variant for deterministic tests. Production callers go through
/// [`encrypt_message`]; reusing a nonce under one key breaks
/// confidentiality.
pub fn seal_with_nonce(
    plaintext: &str,
    key: &RoomKey,
    nonce: [u8; NONCE_SIZE],
) -> Result<String, CryptoError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key.0));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| CryptoError::Encryption)?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Decrypt a blob produced by [`encrypt_message`].
///
/// # Errors
///
/// Returns [`CryptoError::Decryption`] for malformed base64, a blob shorter
/// than the nonce, and a failed authentication tag alike. The failure mode
/// is uniform across all three cases.
pub fn decrypt_message(blob: &str, key: &RoomKey) -> Result<String, CryptoError> {
    let bytes = STANDARD.decode(blob).map_err(|_| CryptoError::Decryption)?;
    if bytes.len() < NONCE_SIZE {
        return Err(CryptoError::Decryption);
    }
    let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(&key.0));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
}
