//! Deterministic associated-data construction.
//!
//! These formats are a persisted contract, not an implementation
//! detail: every stored wrapped key and message ciphertext was
//! authenticated against exactly these strings. Changing either format
//! makes all previously persisted material fail authentication, which
//! is irrecoverable. The literal layouts are pinned by tests below.

/// AAD for wrapping a conversation key under the master key.
///
/// Binds the wrapped material to its conversation and version, so a
/// wrapped key copied to another conversation or re-labelled with a
/// different version fails to unwrap.
pub fn key_wrap_aad(conversation_id: &str, version: u32) -> String {
    format!("chat:{conversation_id}|keyVersion:{version}")
}

/// AAD for encrypting a message payload under a conversation key.
///
/// Binds the ciphertext to its conversation, message, sender, and key
/// version. Even an attacker who controls storage cannot substitute
/// one message's ciphertext into another message/sender/conversation
/// tuple without failing authentication.
pub fn message_aad(conversation_id: &str, message_id: &str, sender_id: &str, version: u32) -> String {
    format!("chat:{conversation_id}|msg:{message_id}|sender:{sender_id}|v:{version}")
}

#[cfg(test)]
mod tests {
    use super::{key_wrap_aad, message_aad};

    // These assert the exact persisted byte layout. If one of these
    // tests fails, existing deployments can no longer decrypt their
    // stored keys and messages.
    #[test]
    fn key_wrap_aad_layout_is_pinned() {
        assert_eq!(key_wrap_aad("c-42", 1), "chat:c-42|keyVersion:1");
        assert_eq!(key_wrap_aad("c-42", 7), "chat:c-42|keyVersion:7");
    }

    #[test]
    fn message_aad_layout_is_pinned() {
        assert_eq!(
            message_aad("c-42", "m-1", "alice", 3),
            "chat:c-42|msg:m-1|sender:alice|v:3"
        );
    }

    #[test]
    fn different_versions_produce_different_aad() {
        assert_ne!(key_wrap_aad("c", 1), key_wrap_aad("c", 2));
        assert_ne!(message_aad("c", "m", "s", 1), message_aad("c", "m", "s", 2));
    }
}
