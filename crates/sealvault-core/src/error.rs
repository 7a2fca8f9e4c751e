//! Key store and pipeline error types.

use sealvault_crypto::CryptoError;
use thiserror::Error;

use crate::{
    storage::StorageError,
    types::{ConversationId, KeyVersion},
};

/// Errors from conversation key lifecycle and message envelope
/// operations.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    /// A key row already exists for the conversation.
    ///
    /// `create_initial_key` is deliberately not idempotent; the caller
    /// must invoke it exactly once per conversation.
    #[error("conversation key already exists for {conversation_id}")]
    KeyAlreadyExists {
        /// Conversation that already has a key
        conversation_id: ConversationId,
    },

    /// The conversation has no active key.
    ///
    /// Data inconsistency: a conversation that encrypts messages must
    /// have exactly one active key. Signals a bug in key lifecycle
    /// management, not an attack.
    #[error("no active key for conversation {conversation_id}")]
    NoActiveKey {
        /// Conversation without an active key
        conversation_id: ConversationId,
    },

    /// A message references a key version that does not exist.
    ///
    /// Data inconsistency between the message row and the key store;
    /// signals a bug in key lifecycle management, not an attack.
    #[error("key version {version} not found for conversation {conversation_id}")]
    KeyVersionNotFound {
        /// Conversation looked up
        conversation_id: ConversationId,
        /// Version that was not found
        version: KeyVersion,
    },

    /// Cryptographic failure.
    ///
    /// `AuthenticationFailed` here means the stored material was
    /// tampered with, the master key changed, or a message AAD did not
    /// match. Terminal and non-retryable; never swallowed into a
    /// generic decryption error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Storage lookup failure. May be transient; retries belong to the
    /// storage layer.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl KeyStoreError {
    /// Whether this error signals referential inconsistency between
    /// messages and the key store.
    ///
    /// These conditions are worth logging loudly: they typically mean
    /// a bug in key lifecycle management rather than tampering or a
    /// transient fault.
    pub fn is_data_inconsistency(&self) -> bool {
        matches!(self, Self::NoActiveKey { .. } | Self::KeyVersionNotFound { .. })
    }
}
