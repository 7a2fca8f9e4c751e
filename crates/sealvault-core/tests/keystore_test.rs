//! Conversation key store behavior tests
//!
//! Lifecycle tests over the in-memory storage backend: initial key
//! minting, double-creation rejection, lookup failures, and tamper
//! detection on stored rows.

use sealvault_core::{
    ConversationId, ConversationKeyRow, ConversationKeyStore, KeyStoreError, KeyStorage,
    KeyVersion, MemoryKeyStorage,
};
use sealvault_crypto::{ConversationSecret, CryptoError, MasterKey, key_wrap_aad, wrap_key};

fn master_key() -> MasterKey {
    MasterKey::from_bytes([0x07; 32])
}

#[tokio::test]
async fn create_initial_key_mints_version_one_active() {
    let storage = MemoryKeyStorage::new();
    let store = ConversationKeyStore::new(storage.clone(), master_key());
    let conversation = ConversationId::new("c-1");

    let version = store.create_initial_key(&conversation).await.unwrap();
    assert_eq!(version, KeyVersion::FIRST);

    let row = storage.load_active(&conversation).await.unwrap().unwrap();
    assert!(row.is_active);
    assert_eq!(row.version, KeyVersion::FIRST);
}

#[tokio::test]
async fn create_initial_key_is_not_idempotent() {
    let store = ConversationKeyStore::new(MemoryKeyStorage::new(), master_key());
    let conversation = ConversationId::new("c-1");

    store.create_initial_key(&conversation).await.unwrap();

    let err = store.create_initial_key(&conversation).await.unwrap_err();
    assert!(matches!(err, KeyStoreError::KeyAlreadyExists { .. }));
}

#[tokio::test]
async fn unknown_conversation_has_no_active_key() {
    let store = ConversationKeyStore::new(MemoryKeyStorage::new(), master_key());

    let err = store.active_key(&ConversationId::new("nope")).await.unwrap_err();
    assert!(matches!(err, KeyStoreError::NoActiveKey { .. }));
    assert!(err.is_data_inconsistency());
}

#[tokio::test]
async fn missing_version_is_not_found() {
    let store = ConversationKeyStore::new(MemoryKeyStorage::new(), master_key());
    let conversation = ConversationId::new("c-1");
    store.create_initial_key(&conversation).await.unwrap();

    let version = KeyVersion::new(99).unwrap();
    let err = store.key_by_version(&conversation, version).await.unwrap_err();
    assert!(matches!(
        err,
        KeyStoreError::KeyVersionNotFound { version: v, .. } if v == version
    ));
    assert!(err.is_data_inconsistency());
}

#[tokio::test]
async fn active_key_lookup_is_stable() {
    let store = ConversationKeyStore::new(MemoryKeyStorage::new(), master_key());
    let conversation = ConversationId::new("c-1");
    store.create_initial_key(&conversation).await.unwrap();

    let first = store.active_key(&conversation).await.unwrap();
    let second = store.active_key(&conversation).await.unwrap();

    assert_eq!(first.version, second.version);
    assert_eq!(first.secret.bytes(), second.secret.bytes());
}

#[tokio::test]
async fn key_by_version_resolves_the_active_row_too() {
    let store = ConversationKeyStore::new(MemoryKeyStorage::new(), master_key());
    let conversation = ConversationId::new("c-1");
    store.create_initial_key(&conversation).await.unwrap();

    let active = store.active_key(&conversation).await.unwrap();
    let by_version = store.key_by_version(&conversation, KeyVersion::FIRST).await.unwrap();
    assert_eq!(active.secret.bytes(), by_version.secret.bytes());
}

#[tokio::test]
async fn tampered_row_fails_authentication() {
    let storage = MemoryKeyStorage::new();
    let master = master_key();
    let conversation = ConversationId::new("c-1");

    // Persist a wrap whose ciphertext was flipped after wrapping.
    let secret = ConversationSecret::generate();
    let wrap_aad = key_wrap_aad(conversation.as_str(), 1);
    let mut wrapped = wrap_key(secret.bytes(), master.bytes(), &wrap_aad).unwrap();
    wrapped.ciphertext[0] ^= 0x01;
    let row =
        ConversationKeyRow::from_wrapped(conversation.clone(), KeyVersion::FIRST, &wrapped, true, 0);
    storage.insert_key(&row).await.unwrap();

    let store = ConversationKeyStore::new(storage, master);
    let err = store.active_key(&conversation).await.unwrap_err();
    assert!(matches!(err, KeyStoreError::Crypto(CryptoError::AuthenticationFailed)));
}

#[tokio::test]
async fn changed_master_key_fails_authentication() {
    let storage = MemoryKeyStorage::new();
    let conversation = ConversationId::new("c-1");

    let store = ConversationKeyStore::new(storage.clone(), master_key());
    store.create_initial_key(&conversation).await.unwrap();

    // Same rows, different process master key.
    let rotated = ConversationKeyStore::new(storage, MasterKey::from_bytes([0x08; 32]));
    let err = rotated.active_key(&conversation).await.unwrap_err();
    assert!(matches!(err, KeyStoreError::Crypto(CryptoError::AuthenticationFailed)));
}
