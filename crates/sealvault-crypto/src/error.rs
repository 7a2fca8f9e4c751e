//! Error types for AEAD operations

use thiserror::Error;

/// Errors from symmetric wrap/unwrap and message encrypt/decrypt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A key of the wrong size was supplied to an AES-256 operation.
    ///
    /// This is a programmer or configuration error, not an attack
    /// signal. The operation aborts; retrying with the same key cannot
    /// succeed.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Supplied key length in bytes
        actual: usize,
    },

    /// Authentication tag verification failed.
    ///
    /// Covers tampered ciphertext, a wrong or truncated IV or tag, a
    /// wrong key, and AAD mismatch. Deliberately carries no detail
    /// about which check failed so the error cannot be used as a
    /// decryption oracle. Terminal: retrying with the same inputs
    /// cannot succeed.
    #[error("authentication failed")]
    AuthenticationFailed,
}

#[cfg(test)]
mod tests {
    use super::CryptoError;

    #[test]
    fn error_display() {
        let err = CryptoError::InvalidKeyLength { expected: 32, actual: 16 };
        assert_eq!(err.to_string(), "invalid key length: expected 32, got 16");

        assert_eq!(CryptoError::AuthenticationFailed.to_string(), "authentication failed");
    }
}
