//! Shared AES-256-GCM seal/open used by key wrap and the message cipher.
//!
//! Both layers of the envelope use the same AEAD construction and the
//! same length contracts; only the key and the AAD namespace differ.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;

use crate::error::CryptoError;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// GCM IV size in bytes (96 bits).
pub const IV_SIZE: usize = 12;

/// GCM authentication tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// Reject any key that is not exactly 32 bytes.
pub(crate) fn validate_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: key.len() });
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`, binding `aad` into the tag.
///
/// Generates a fresh random 96-bit IV per call. Returns
/// `(ciphertext, iv, tag)` with the tag split off the ciphertext.
pub(crate) fn seal(
    key: &[u8],
    aad: &str,
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; IV_SIZE], [u8; TAG_SIZE]), CryptoError> {
    validate_key(key)?;

    let Ok(cipher) = Aes256Gcm::new_from_slice(key) else {
        unreachable!("key length was validated above");
    };

    let mut iv = [0u8; IV_SIZE];
    rand::thread_rng().fill_bytes(&mut iv);

    let payload = Payload { msg: plaintext, aad: aad.as_bytes() };
    let Ok(mut sealed) = cipher.encrypt(Nonce::from_slice(&iv), payload) else {
        unreachable!("AES-256-GCM encryption cannot fail with valid inputs");
    };

    // The RustCrypto AEAD API appends the tag; persist it as its own field.
    let tag_vec = sealed.split_off(sealed.len() - TAG_SIZE);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&tag_vec);

    Ok((sealed, iv, tag))
}

/// Decrypt `ciphertext` under `key`, verifying the tag against `aad`.
///
/// Any verification failure is reported as
/// [`CryptoError::AuthenticationFailed`], never partially decrypted
/// output.
pub(crate) fn open(
    key: &[u8],
    iv: &[u8; IV_SIZE],
    tag: &[u8; TAG_SIZE],
    aad: &str,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    validate_key(key)?;

    let Ok(cipher) = Aes256Gcm::new_from_slice(key) else {
        unreachable!("key length was validated above");
    };

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let payload = Payload { msg: sealed.as_slice(), aad: aad.as_bytes() };
    cipher
        .decrypt(Nonce::from_slice(iv), payload)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::{IV_SIZE, KEY_SIZE, TAG_SIZE, open, seal};
    use crate::error::CryptoError;

    #[test]
    fn seal_open_roundtrip() {
        let key = [0x11u8; KEY_SIZE];
        let (ciphertext, iv, tag) = seal(&key, "ctx", b"payload").unwrap();
        let plaintext = open(&key, &iv, &tag, "ctx", &ciphertext).unwrap();
        assert_eq!(plaintext, b"payload");
    }

    #[test]
    fn seal_splits_tag_from_ciphertext() {
        let key = [0x22u8; KEY_SIZE];
        let (ciphertext, _, tag) = seal(&key, "ctx", b"four").unwrap();
        assert_eq!(ciphertext.len(), 4);
        assert_eq!(tag.len(), TAG_SIZE);
    }

    #[test]
    fn fresh_iv_per_call() {
        let key = [0x33u8; KEY_SIZE];
        let (ct1, iv1, _) = seal(&key, "ctx", b"same").unwrap();
        let (ct2, iv2, _) = seal(&key, "ctx", b"same").unwrap();
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn rejects_short_and_long_keys() {
        for len in [0usize, 16, 31, 33] {
            let key = vec![0u8; len];
            let err = seal(&key, "ctx", b"data").unwrap_err();
            assert_eq!(err, CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: len });

            let err = open(&key, &[0u8; IV_SIZE], &[0u8; TAG_SIZE], "ctx", b"data").unwrap_err();
            assert_eq!(err, CryptoError::InvalidKeyLength { expected: KEY_SIZE, actual: len });
        }
    }
}
