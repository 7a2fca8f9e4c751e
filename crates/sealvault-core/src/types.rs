//! Identifier newtypes shared across the key store and pipeline.
//!
//! Conversation, message, and sender identifiers are opaque to this
//! crate; they come from the surrounding chat service and are only
//! ever compared and written into AAD strings. Newtypes keep the three
//! from being swapped at a call site, which would silently produce
//! undecryptable AAD bindings.

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};

/// Opaque conversation identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap an identifier supplied by the chat service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice (used in AAD construction).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque message identifier.
///
/// Pre-generated by the caller, not database-assigned, so it is known
/// before encryption and can be bound into the message AAD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an identifier supplied by the chat service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque sender identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SenderId(String);

impl SenderId {
    /// Wrap an identifier supplied by the chat service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation key version: a monotonic positive integer, unique per
/// conversation.
///
/// Versions are immutable once created. Rotation would mint the next
/// version and flip the active flag; only the multi-version read
/// mechanics exist here, rotation policy is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyVersion(NonZeroU32);

impl KeyVersion {
    /// The version minted for a conversation's first key.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Construct from a stored integer. Returns `None` for zero.
    pub fn new(version: u32) -> Option<Self> {
        NonZeroU32::new(version).map(Self)
    }

    /// The version as an integer (used in AAD construction).
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The next version in sequence (saturating).
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
