//! Sealvault Cryptographic Primitives
//!
//! Building blocks for protecting chat message content at rest with a
//! two-tier envelope-encryption scheme. Everything in this crate is
//! synchronous and side-effect-free beyond its return value; key rows
//! and message rows live in `sealvault-core`.
//!
//! # Key Hierarchy
//!
//! ```text
//! RSA-wrapped blob + private key (process configuration)
//!        │
//!        ▼ RSA-OAEP-SHA256
//! Master Key (256-bit, process lifetime)
//!        │
//!        ▼ AES-256-GCM key wrap, AAD = "chat:<id>|keyVersion:<v>"
//! Conversation Secret (256-bit, one per conversation key version)
//!        │
//!        ▼ AES-256-GCM, AAD = "chat:<id>|msg:<m>|sender:<s>|v:<v>"
//! Message Ciphertext
//! ```
//!
//! # Security
//!
//! Authenticity:
//! - AES-256-GCM with a fresh 96-bit random IV per operation and a
//!   128-bit tag
//! - AAD binds every ciphertext to its conversation, message, sender,
//!   and key version; moving ciphertext to any other context fails
//!   authentication
//! - Tag verification failures are reported as a single
//!   [`CryptoError::AuthenticationFailed`] with no detail about which
//!   check failed (no decryption oracle)
//!
//! Key Hygiene:
//! - [`MasterKey`] and [`ConversationSecret`] are zeroized on drop and
//!   redacted in `Debug` output
//! - Neither type serializes; only wrapped material is persisted

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aad;
mod aead;
pub mod error;
pub mod keywrap;
pub mod master_key;
pub mod message;

pub use aad::{key_wrap_aad, message_aad};
pub use aead::{IV_SIZE, KEY_SIZE, TAG_SIZE};
pub use error::CryptoError;
pub use keywrap::{ConversationSecret, WrappedKeyMaterial, unwrap_key, wrap_key};
pub use master_key::{MasterKey, MasterKeyConfig, MasterKeyError};
pub use message::{EncryptedPayload, decrypt_message, encrypt_message};
