//! Message pipeline: envelope encryption at the message write/read
//! boundary.
//!
//! Write path: resolve the conversation's active key, bind the message
//! AAD, encrypt, and hand back the persistable crypto fields. Read
//! path: batch decrypt with a batch-local per-version key cache that
//! is discarded when the call returns, bounding how long unwrapped
//! secrets stay resident and preventing stale-key reuse across
//! batches.
//!
//! Failure policy for batch reads: every row gets its own outcome.
//! A failed row is reported as [`MessageContent::Unreadable`] with the
//! precise error; the pipeline never drops an item and never fails the
//! rest of the batch on one item's behalf. The calling layer decides
//! whether one unreadable row fails the whole request.

use std::collections::{HashMap, hash_map::Entry};

use sealvault_crypto::{
    ConversationSecret, IV_SIZE, TAG_SIZE, aad, decrypt_message, encrypt_message,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::KeyStoreError,
    keystore::ConversationKeyStore,
    storage::KeyStorage,
    types::{ConversationId, KeyVersion, MessageId, SenderId},
};

/// The crypto fields persisted alongside an encrypted message row.
///
/// Always carried together: a message either has the full triple plus
/// key version, or none of it (an unencrypted, metadata-only row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCrypto {
    /// Ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// 96-bit GCM IV.
    pub iv: [u8; IV_SIZE],
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// Conversation key version the message was encrypted under.
    pub key_version: KeyVersion,
}

/// A stored message row as consumed by the batch read path.
#[derive(Debug, Clone)]
pub struct SealedMessage {
    /// Message identifier (bound into the AAD).
    pub message_id: MessageId,
    /// Sender identifier (bound into the AAD).
    pub sender_id: SenderId,
    /// Crypto fields, or `None` for a plaintext-absent row.
    pub crypto: Option<MessageCrypto>,
}

/// Outcome for a single row of a batch read.
#[derive(Debug)]
pub enum MessageContent {
    /// Recovered plaintext.
    Plaintext(Vec<u8>),
    /// The row never had an encrypted payload (metadata-only message).
    Absent,
    /// Decryption failed; the error says whether this was tampering
    /// (`Crypto`) or a key-lifecycle inconsistency
    /// (`KeyVersionNotFound`). Render as "message unavailable"
    /// upstream.
    Unreadable(KeyStoreError),
}

/// A decrypted batch row, paired with its message id.
#[derive(Debug)]
pub struct OpenedMessage {
    /// The row's message identifier.
    pub message_id: MessageId,
    /// Per-row outcome.
    pub content: MessageContent,
}

/// Orchestrates encrypt-on-write and batch decrypt-on-read.
pub struct MessagePipeline<S: KeyStorage> {
    keys: ConversationKeyStore<S>,
}

impl<S: KeyStorage> MessagePipeline<S> {
    /// Create a pipeline over a conversation key store.
    pub fn new(keys: ConversationKeyStore<S>) -> Self {
        Self { keys }
    }

    /// The underlying key store (for conversation key lifecycle calls
    /// from the surrounding service).
    pub fn key_store(&self) -> &ConversationKeyStore<S> {
        &self.keys
    }

    /// Encrypt a message payload for persistence.
    ///
    /// Returns `None` for an empty payload: empty messages are stored
    /// unencrypted with absent crypto fields rather than as a
    /// zero-length ciphertext. The message id must be pre-generated so
    /// it can be bound into the AAD before the row exists.
    ///
    /// # Errors
    ///
    /// - `NoActiveKey`: the conversation has no active key
    /// - `AuthenticationFailed`: the stored key material was tampered
    ///   with or the master key changed
    pub async fn seal_message(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
        sender_id: &SenderId,
        plaintext: &[u8],
    ) -> Result<Option<MessageCrypto>, KeyStoreError> {
        if plaintext.is_empty() {
            return Ok(None);
        }

        let key = self.keys.active_key(conversation_id).await?;
        let message_aad = aad::message_aad(
            conversation_id.as_str(),
            message_id.as_str(),
            sender_id.as_str(),
            key.version.get(),
        );
        let payload = encrypt_message(plaintext, key.secret.bytes(), &message_aad)?;

        Ok(Some(MessageCrypto {
            ciphertext: payload.ciphertext,
            iv: payload.iv,
            tag: payload.tag,
            key_version: key.version,
        }))
    }

    /// Decrypt a batch of message rows.
    ///
    /// Each distinct key version in the batch is resolved once; the
    /// cache lives only for this call and is dropped (zeroizing the
    /// secrets) before it returns. Rows without crypto fields pass
    /// through as [`MessageContent::Absent`]. Failures surface per
    /// row; the batch always returns one outcome per input row, in
    /// input order.
    pub async fn open_batch(
        &self,
        conversation_id: &ConversationId,
        rows: &[SealedMessage],
    ) -> Vec<OpenedMessage> {
        let mut version_cache: HashMap<KeyVersion, ConversationSecret> = HashMap::new();
        let mut opened = Vec::with_capacity(rows.len());

        for row in rows {
            let content = match &row.crypto {
                None => MessageContent::Absent,
                Some(crypto) => {
                    match self.open_row(conversation_id, row, crypto, &mut version_cache).await {
                        Ok(plaintext) => MessageContent::Plaintext(plaintext),
                        Err(err) => {
                            tracing::warn!(
                                conversation = %conversation_id,
                                message = %row.message_id,
                                inconsistency = err.is_data_inconsistency(),
                                error = %err,
                                "message unreadable"
                            );
                            MessageContent::Unreadable(err)
                        },
                    }
                },
            };
            opened.push(OpenedMessage { message_id: row.message_id.clone(), content });
        }

        opened
    }

    async fn open_row(
        &self,
        conversation_id: &ConversationId,
        row: &SealedMessage,
        crypto: &MessageCrypto,
        version_cache: &mut HashMap<KeyVersion, ConversationSecret>,
    ) -> Result<Vec<u8>, KeyStoreError> {
        let secret = match version_cache.entry(crypto.key_version) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let key = self.keys.key_by_version(conversation_id, crypto.key_version).await?;
                entry.insert(key.secret)
            },
        };

        let message_aad = aad::message_aad(
            conversation_id.as_str(),
            row.message_id.as_str(),
            row.sender_id.as_str(),
            crypto.key_version.get(),
        );

        Ok(decrypt_message(
            &crypto.ciphertext,
            secret.bytes(),
            &message_aad,
            &crypto.iv,
            &crypto.tag,
        )?)
    }
}
