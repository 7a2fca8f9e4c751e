//! Sealvault Core
//!
//! Conversation key lifecycle and the message envelope pipeline.
//! Builds on [`sealvault_crypto`] for the actual transforms and on a
//! pluggable async [`KeyStorage`] backend for the persisted key rows.
//!
//! ```text
//! MessagePipeline ── seal_message / open_batch
//!        │
//!        ▼
//! ConversationKeyStore ── create_initial_key / active_key / key_by_version
//!        │                        │
//!        ▼                        ▼
//! KeyStorage (rows)        sealvault-crypto (wrap, AEAD, master key)
//! ```
//!
//! The master key is constructed once at process start
//! ([`sealvault_crypto::MasterKey::from_config`]) and injected into
//! the key store; nothing here holds global state. All cryptographic
//! calls are synchronous and short-lived; only key-row lookups
//! suspend.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod keystore;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use error::KeyStoreError;
pub use keystore::{ConversationKey, ConversationKeyStore};
pub use pipeline::{MessageContent, MessageCrypto, MessagePipeline, OpenedMessage, SealedMessage};
pub use storage::{ConversationKeyRow, KeyStorage, MemoryKeyStorage, StorageError};
pub use types::{ConversationId, KeyVersion, MessageId, SenderId};
