//! Key wrap: AES-256-GCM of one 256-bit key under another.
//!
//! The wrapping key is the process master key; the wrapped key is a
//! per-conversation secret. The caller supplies the AAD (see
//! [`crate::aad::key_wrap_aad`]) and must use the identical string for
//! wrap and unwrap.

use std::fmt;

use rand::RngCore;
use zeroize::Zeroize;

use crate::{
    aead::{self, IV_SIZE, KEY_SIZE, TAG_SIZE},
    error::CryptoError,
};

/// A 256-bit conversation secret (DEK).
///
/// Exists unwrapped only in process memory, returned by-value to the
/// caller of [`unwrap_key`]. Zeroized on drop; callers must not retain
/// it beyond the operation that needed it (a batch-local cache is the
/// longest acceptable lifetime).
pub struct ConversationSecret {
    bytes: [u8; KEY_SIZE],
}

impl ConversationSecret {
    /// Generate a fresh random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Construct from raw bytes.
    ///
    /// Intended for tests and fixtures; production secrets come from
    /// [`ConversationSecret::generate`] or [`unwrap_key`].
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// The raw 32-byte key material.
    pub fn bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for ConversationSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for ConversationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConversationSecret(..)")
    }
}

/// Wrapped (encrypted) conversation key material.
///
/// The AEAD field triple is always carried together; a partially
/// supplied triple cannot be represented. The fixed-size `iv` and
/// `tag` fields enforce the 96-bit/128-bit contracts structurally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKeyMaterial {
    /// Encrypted 32-byte conversation secret.
    pub ciphertext: Vec<u8>,
    /// 96-bit GCM IV, fresh per wrap.
    pub iv: [u8; IV_SIZE],
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_SIZE],
}

/// Wrap a 256-bit secret under a 256-bit wrapping key.
///
/// Generates a fresh random 96-bit IV per call.
///
/// # Errors
///
/// - `InvalidKeyLength`: either key is not exactly 32 bytes
pub fn wrap_key(
    secret: &[u8],
    wrapping_key: &[u8],
    aad: &str,
) -> Result<WrappedKeyMaterial, CryptoError> {
    if secret.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: secret.len() });
    }

    let (ciphertext, iv, tag) = aead::seal(wrapping_key, aad, secret)?;
    Ok(WrappedKeyMaterial { ciphertext, iv, tag })
}

/// Unwrap a previously wrapped conversation secret.
///
/// # Errors
///
/// - `InvalidKeyLength`: the wrapping key is not exactly 32 bytes
/// - `AuthenticationFailed`: the tag does not verify against the
///   supplied ciphertext, IV, and AAD. Also covers AAD mismatch,
///   truncated ciphertext, and a wrong wrapping key; the error never
///   distinguishes which check failed.
pub fn unwrap_key(
    wrapped: &WrappedKeyMaterial,
    wrapping_key: &[u8],
    aad: &str,
) -> Result<ConversationSecret, CryptoError> {
    let mut plaintext = aead::open(wrapping_key, &wrapped.iv, &wrapped.tag, aad, &wrapped.ciphertext)?;

    // A valid wrap always contains exactly 32 bytes; anything else
    // means the stored material was not produced by `wrap_key`.
    if plaintext.len() != KEY_SIZE {
        plaintext.zeroize();
        return Err(CryptoError::AuthenticationFailed);
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&plaintext);
    plaintext.zeroize();

    Ok(ConversationSecret { bytes })
}
