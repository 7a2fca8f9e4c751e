//! Storage error types.

use thiserror::Error;

use crate::types::{ConversationId, KeyVersion};

/// Errors from the key-row storage backend.
///
/// These cover the storage seam only; unwrap and authentication
/// failures are reported by the key store, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Uniqueness violation on insert.
    ///
    /// Either the `(conversation, version)` pair already exists, or a
    /// second active key was inserted for a conversation that already
    /// has one. Both indicate a bug in key lifecycle management.
    #[error("key row conflict for conversation {conversation_id}, version {version}")]
    Conflict {
        /// Conversation whose row conflicted
        conversation_id: ConversationId,
        /// Version that conflicted
        version: KeyVersion,
    },

    /// Failed to encode or decode a stored row.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying storage system failure (I/O, connection, etc.).
    ///
    /// May be transient; retries belong here, never at the crypto
    /// layer.
    #[error("I/O error: {0}")]
    Io(String),
}
