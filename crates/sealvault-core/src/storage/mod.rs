//! Storage abstraction for conversation key rows.
//!
//! Trait-based abstraction over the key-row table owned by the
//! surrounding chat service's database. Lookups may suspend awaiting
//! storage, so the trait is async; the cryptographic transforms that
//! consume the rows never are.

mod error;
mod memory;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
pub use error::StorageError;
pub use memory::MemoryKeyStorage;
use sealvault_crypto::{CryptoError, IV_SIZE, TAG_SIZE, WrappedKeyMaterial};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, KeyVersion};

/// A persisted conversation key row.
///
/// `(conversation_id, version)` is unique; exactly one row per
/// conversation is active at a time. Rows are immutable once created:
/// there is no in-place key replacement. The wrapped AEAD triple is
/// stored as base64 text columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationKeyRow {
    /// Conversation this key belongs to.
    pub conversation_id: ConversationId,
    /// Key version, unique per conversation.
    pub version: KeyVersion,
    /// Base64 ciphertext of the wrapped 32-byte conversation secret.
    pub wrapped_key_b64: String,
    /// Base64 96-bit wrap IV.
    pub wrap_iv_b64: String,
    /// Base64 128-bit wrap tag.
    pub wrap_tag_b64: String,
    /// Whether this is the conversation's active key.
    pub is_active: bool,
    /// Unix timestamp (seconds) when the row was created.
    pub created_at_secs: u64,
}

impl ConversationKeyRow {
    /// Build a row from freshly wrapped key material.
    pub fn from_wrapped(
        conversation_id: ConversationId,
        version: KeyVersion,
        wrapped: &WrappedKeyMaterial,
        is_active: bool,
        created_at_secs: u64,
    ) -> Self {
        Self {
            conversation_id,
            version,
            wrapped_key_b64: BASE64.encode(&wrapped.ciphertext),
            wrap_iv_b64: BASE64.encode(wrapped.iv),
            wrap_tag_b64: BASE64.encode(wrapped.tag),
            is_active,
            created_at_secs,
        }
    }

    /// Decode the stored wrapped material.
    ///
    /// Any malformation (bad base64, wrong IV or tag length) is
    /// indistinguishable from tampering with the stored columns and is
    /// reported as [`CryptoError::AuthenticationFailed`].
    pub fn wrapped_material(&self) -> Result<WrappedKeyMaterial, CryptoError> {
        let ciphertext =
            BASE64.decode(&self.wrapped_key_b64).map_err(|_| CryptoError::AuthenticationFailed)?;

        let iv: [u8; IV_SIZE] = BASE64
            .decode(&self.wrap_iv_b64)
            .map_err(|_| CryptoError::AuthenticationFailed)?
            .try_into()
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        let tag: [u8; TAG_SIZE] = BASE64
            .decode(&self.wrap_tag_b64)
            .map_err(|_| CryptoError::AuthenticationFailed)?
            .try_into()
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(WrappedKeyMaterial { ciphertext, iv, tag })
    }
}

/// Storage abstraction for conversation key rows.
///
/// Implementations must be `Send + Sync` (shared across request
/// tasks). Methods are async because lookups may await a database;
/// implementations typically share state via `Arc`.
#[async_trait]
pub trait KeyStorage: Send + Sync + 'static {
    /// Insert a key row.
    ///
    /// # Invariants
    ///
    /// - `(conversation_id, version)` must not already exist
    /// - At most one active row per conversation; inserting a second
    ///   active row is a `Conflict`
    async fn insert_key(&self, row: &ConversationKeyRow) -> Result<(), StorageError>;

    /// Whether any key row exists for the conversation, regardless of
    /// the active flag.
    async fn has_any_key(&self, conversation_id: &ConversationId) -> Result<bool, StorageError>;

    /// Load the conversation's active key row. `None` if the
    /// conversation has no active key.
    async fn load_active(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationKeyRow>, StorageError>;

    /// Load a key row by exact version, regardless of the active flag.
    ///
    /// Needed to decrypt historical messages encrypted under a
    /// since-rotated key. `None` if the version does not exist.
    async fn load_by_version(
        &self,
        conversation_id: &ConversationId,
        version: KeyVersion,
    ) -> Result<Option<ConversationKeyRow>, StorageError>;
}

#[cfg(test)]
mod tests {
    use sealvault_crypto::{CryptoError, WrappedKeyMaterial};

    use super::ConversationKeyRow;
    use crate::types::{ConversationId, KeyVersion};

    fn sample_row() -> ConversationKeyRow {
        let wrapped = WrappedKeyMaterial {
            ciphertext: vec![0xAB; 32],
            iv: [0x01; 12],
            tag: [0x02; 16],
        };
        ConversationKeyRow::from_wrapped(
            ConversationId::new("c-1"),
            KeyVersion::FIRST,
            &wrapped,
            true,
            1_700_000_000,
        )
    }

    #[test]
    fn encode_decode_roundtrip() {
        let row = sample_row();
        let wrapped = row.wrapped_material().unwrap();
        assert_eq!(wrapped.ciphertext, vec![0xAB; 32]);
        assert_eq!(wrapped.iv, [0x01; 12]);
        assert_eq!(wrapped.tag, [0x02; 16]);
    }

    #[test]
    fn malformed_base64_reads_as_tampering() {
        let mut row = sample_row();
        row.wrapped_key_b64 = "not base64!!".to_owned();
        assert_eq!(row.wrapped_material().unwrap_err(), CryptoError::AuthenticationFailed);
    }

    #[test]
    fn wrong_iv_length_reads_as_tampering() {
        let mut row = sample_row();
        row.wrap_iv_b64 = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            [0u8; 8],
        );
        assert_eq!(row.wrapped_material().unwrap_err(), CryptoError::AuthenticationFailed);
    }
}
