//! In-memory key-row storage for tests and embedding.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use super::{ConversationKeyRow, KeyStorage, StorageError};
use crate::types::{ConversationId, KeyVersion};

/// In-memory storage implementation for testing and simulation.
///
/// Rows are kept per conversation in insertion order. State is wrapped
/// in `Arc<Mutex<>>` so clones share the same underlying table.
/// Uses `lock().expect()` which will panic if the mutex is poisoned -
/// acceptable for test code.
#[derive(Clone, Default)]
pub struct MemoryKeyStorage {
    inner: Arc<Mutex<HashMap<ConversationId, Vec<ConversationKeyRow>>>>,
}

impl MemoryKeyStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of key rows across all conversations.
    ///
    /// Useful for debugging and testing.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    pub fn row_count(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").values().map(Vec::len).sum()
    }
}

#[async_trait]
impl KeyStorage for MemoryKeyStorage {
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned. Acceptable for test
    /// code.
    #[allow(clippy::expect_used)]
    async fn insert_key(&self, row: &ConversationKeyRow) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        let rows = inner.entry(row.conversation_id.clone()).or_default();

        let version_taken = rows.iter().any(|existing| existing.version == row.version);
        let second_active = row.is_active && rows.iter().any(|existing| existing.is_active);
        if version_taken || second_active {
            return Err(StorageError::Conflict {
                conversation_id: row.conversation_id.clone(),
                version: row.version,
            });
        }

        rows.push(row.clone());
        Ok(())
    }

    #[allow(clippy::expect_used)]
    async fn has_any_key(&self, conversation_id: &ConversationId) -> Result<bool, StorageError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner.get(conversation_id).is_some_and(|rows| !rows.is_empty()))
    }

    #[allow(clippy::expect_used)]
    async fn load_active(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<ConversationKeyRow>, StorageError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner
            .get(conversation_id)
            .and_then(|rows| rows.iter().find(|row| row.is_active).cloned()))
    }

    #[allow(clippy::expect_used)]
    async fn load_by_version(
        &self,
        conversation_id: &ConversationId,
        version: KeyVersion,
    ) -> Result<Option<ConversationKeyRow>, StorageError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner
            .get(conversation_id)
            .and_then(|rows| rows.iter().find(|row| row.version == version).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyStorage, MemoryKeyStorage, StorageError};
    use crate::{
        storage::ConversationKeyRow,
        types::{ConversationId, KeyVersion},
    };

    fn row(conversation: &str, version: KeyVersion, is_active: bool) -> ConversationKeyRow {
        ConversationKeyRow {
            conversation_id: ConversationId::new(conversation),
            version,
            wrapped_key_b64: String::new(),
            wrap_iv_b64: String::new(),
            wrap_tag_b64: String::new(),
            is_active,
            created_at_secs: 0,
        }
    }

    #[tokio::test]
    async fn insert_and_load_roundtrip() {
        let storage = MemoryKeyStorage::new();
        let conversation = ConversationId::new("c-1");

        storage.insert_key(&row("c-1", KeyVersion::FIRST, true)).await.unwrap();

        assert!(storage.has_any_key(&conversation).await.unwrap());
        let active = storage.load_active(&conversation).await.unwrap().unwrap();
        assert_eq!(active.version, KeyVersion::FIRST);

        let by_version =
            storage.load_by_version(&conversation, KeyVersion::FIRST).await.unwrap().unwrap();
        assert_eq!(by_version, active);
    }

    #[tokio::test]
    async fn duplicate_version_conflicts() {
        let storage = MemoryKeyStorage::new();
        storage.insert_key(&row("c-1", KeyVersion::FIRST, true)).await.unwrap();

        let err = storage.insert_key(&row("c-1", KeyVersion::FIRST, false)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn second_active_row_conflicts() {
        let storage = MemoryKeyStorage::new();
        storage.insert_key(&row("c-1", KeyVersion::FIRST, true)).await.unwrap();

        let err =
            storage.insert_key(&row("c-1", KeyVersion::FIRST.next(), true)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));

        // An inactive historical version is fine.
        storage.insert_key(&row("c-1", KeyVersion::FIRST.next(), false)).await.unwrap();
        assert_eq!(storage.row_count(), 2);
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let storage = MemoryKeyStorage::new();
        storage.insert_key(&row("c-1", KeyVersion::FIRST, true)).await.unwrap();

        let other = ConversationId::new("c-2");
        assert!(!storage.has_any_key(&other).await.unwrap());
        assert!(storage.load_active(&other).await.unwrap().is_none());
    }
}
