//! Message cipher: AES-256-GCM over message plaintext.
//!
//! Keyed by a conversation secret rather than the master key, with the
//! message AAD namespace (see [`crate::aad::message_aad`]). The empty
//! payload is never encrypted; callers represent it as an absent
//! crypto record instead of a zero-length ciphertext.

use crate::{
    aead::{self, IV_SIZE, TAG_SIZE},
    error::CryptoError,
};

/// An encrypted message payload.
///
/// The AEAD field triple is always carried together. The key version
/// used to encrypt is attached by the pipeline layer, which owns the
/// persisted message row shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// 96-bit GCM IV, fresh per encryption.
    pub iv: [u8; IV_SIZE],
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_SIZE],
}

/// Encrypt message plaintext under a conversation secret.
///
/// # Errors
///
/// - `InvalidKeyLength`: the secret is not exactly 32 bytes
pub fn encrypt_message(
    plaintext: &[u8],
    secret: &[u8],
    aad: &str,
) -> Result<EncryptedPayload, CryptoError> {
    let (ciphertext, iv, tag) = aead::seal(secret, aad, plaintext)?;
    Ok(EncryptedPayload { ciphertext, iv, tag })
}

/// Decrypt a message payload under a conversation secret.
///
/// # Errors
///
/// - `InvalidKeyLength`: the secret is not exactly 32 bytes
/// - `AuthenticationFailed`: tag verification failed (tampering, wrong
///   key, or wrong AAD; never distinguished)
pub fn decrypt_message(
    ciphertext: &[u8],
    secret: &[u8],
    aad: &str,
    iv: &[u8; IV_SIZE],
    tag: &[u8; TAG_SIZE],
) -> Result<Vec<u8>, CryptoError> {
    aead::open(secret, iv, tag, aad, ciphertext)
}
