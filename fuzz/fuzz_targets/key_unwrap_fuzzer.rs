//! Fuzz target for conversation key unwrap
//!
//! # Strategy
//!
//! - Arbitrary wrapped triples standing in for tampered key rows
//! - Arbitrary conversation id / version AAD inputs
//!
//! # Invariants
//!
//! - NEVER panic on malformed stored material
//! - Forged material never unwraps to a secret

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealvault_crypto::{CryptoError, KEY_SIZE, WrappedKeyMaterial, key_wrap_aad, unwrap_key};

#[derive(Debug, Arbitrary)]
struct UnwrapInput {
    wrapping_key: Vec<u8>,
    ciphertext: Vec<u8>,
    iv: [u8; 12],
    tag: [u8; 16],
    conversation_id: String,
    version: u32,
}

fuzz_target!(|input: UnwrapInput| {
    let wrapped = WrappedKeyMaterial {
        ciphertext: input.ciphertext,
        iv: input.iv,
        tag: input.tag,
    };
    let aad = key_wrap_aad(&input.conversation_id, input.version);

    match unwrap_key(&wrapped, &input.wrapping_key, &aad) {
        Ok(_) => panic!("forged wrapped material authenticated"),
        Err(CryptoError::InvalidKeyLength { actual, .. }) => {
            assert_ne!(actual, KEY_SIZE);
        }
        Err(CryptoError::AuthenticationFailed) => {
            assert_eq!(input.wrapping_key.len(), KEY_SIZE);
        }
    }
});
