//! Versioned per-conversation key lifecycle.
//!
//! The store mints, activates, and resolves conversation keys over a
//! [`KeyStorage`] backend. Secrets are wrapped under the injected
//! master key with the deterministic wrap AAD; the identical AAD
//! construction is used on unwrap, so a row moved between
//! conversations or re-labelled with another version fails
//! authentication.

use sealvault_crypto::{ConversationSecret, MasterKey, aad, unwrap_key, wrap_key};

use crate::{
    error::KeyStoreError,
    storage::{ConversationKeyRow, KeyStorage},
    types::{ConversationId, KeyVersion},
};

/// An unwrapped conversation key, returned by-value.
///
/// Ephemeral: callers must not retain it beyond the operation that
/// needed it. A batch-local cache is the longest acceptable lifetime.
#[derive(Debug)]
pub struct ConversationKey {
    /// The unwrapped 256-bit conversation secret.
    pub secret: ConversationSecret,
    /// The version the secret was stored under.
    pub version: KeyVersion,
}

/// Creates, activates, and resolves versioned conversation keys.
///
/// Holds the process master key as an immutable injected value; safe
/// for concurrent use from multiple request tasks.
pub struct ConversationKeyStore<S: KeyStorage> {
    storage: S,
    master_key: MasterKey,
}

impl<S: KeyStorage> ConversationKeyStore<S> {
    /// Create a store over `storage`, wrapping under `master_key`.
    pub fn new(storage: S, master_key: MasterKey) -> Self {
        Self { storage, master_key }
    }

    /// Mint version 1 for a conversation and persist it as active.
    ///
    /// Not idempotent by design: conversation-creation logic must call
    /// this exactly once.
    ///
    /// # Errors
    ///
    /// - `KeyAlreadyExists`: any key row exists for the conversation
    pub async fn create_initial_key(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<KeyVersion, KeyStoreError> {
        if self.storage.has_any_key(conversation_id).await? {
            return Err(KeyStoreError::KeyAlreadyExists {
                conversation_id: conversation_id.clone(),
            });
        }

        let version = KeyVersion::FIRST;
        let secret = ConversationSecret::generate();
        let wrap_aad = aad::key_wrap_aad(conversation_id.as_str(), version.get());
        let wrapped = wrap_key(secret.bytes(), self.master_key.bytes(), &wrap_aad)?;

        let row = ConversationKeyRow::from_wrapped(
            conversation_id.clone(),
            version,
            &wrapped,
            true,
            wall_clock_secs(),
        );
        self.storage.insert_key(&row).await?;

        tracing::info!(conversation = %conversation_id, version = version.get(), "minted initial conversation key");
        Ok(version)
    }

    /// Resolve and unwrap the conversation's active key.
    ///
    /// # Errors
    ///
    /// - `NoActiveKey`: the conversation has no active key row
    /// - `AuthenticationFailed`: the stored wrapped material was
    ///   tampered with, or the master key has changed
    pub async fn active_key(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<ConversationKey, KeyStoreError> {
        let Some(row) = self.storage.load_active(conversation_id).await? else {
            tracing::warn!(conversation = %conversation_id, "no active conversation key");
            return Err(KeyStoreError::NoActiveKey { conversation_id: conversation_id.clone() });
        };
        self.unwrap_row(&row)
    }

    /// Resolve and unwrap a key by exact version, regardless of the
    /// active flag.
    ///
    /// Needed to decrypt historical messages encrypted under a
    /// since-rotated key.
    ///
    /// # Errors
    ///
    /// - `KeyVersionNotFound`: the version does not exist for the
    ///   conversation
    /// - `AuthenticationFailed`: the stored wrapped material was
    ///   tampered with, or the master key has changed
    pub async fn key_by_version(
        &self,
        conversation_id: &ConversationId,
        version: KeyVersion,
    ) -> Result<ConversationKey, KeyStoreError> {
        let Some(row) = self.storage.load_by_version(conversation_id, version).await? else {
            tracing::warn!(
                conversation = %conversation_id,
                version = version.get(),
                "message references a conversation key version that does not exist"
            );
            return Err(KeyStoreError::KeyVersionNotFound {
                conversation_id: conversation_id.clone(),
                version,
            });
        };
        self.unwrap_row(&row)
    }

    fn unwrap_row(&self, row: &ConversationKeyRow) -> Result<ConversationKey, KeyStoreError> {
        let wrapped = row.wrapped_material()?;
        let wrap_aad = aad::key_wrap_aad(row.conversation_id.as_str(), row.version.get());
        let secret = unwrap_key(&wrapped, self.master_key.bytes(), &wrap_aad)?;
        Ok(ConversationKey { secret, version: row.version })
    }
}

fn wall_clock_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
