//! Fuzz target for message decryption
//!
//! # Strategy
//!
//! - Arbitrary key lengths (wrong sizes must be rejected up front)
//! - Arbitrary ciphertext/IV/tag triples (forged material)
//! - Arbitrary AAD strings (context substitution)
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - Wrong key length always reports `InvalidKeyLength` with the
//!   supplied length
//! - With a 32-byte key, forged material always reports
//!   `AuthenticationFailed`, never corrupted plaintext

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sealvault_crypto::{CryptoError, KEY_SIZE, decrypt_message};

#[derive(Debug, Arbitrary)]
struct DecryptInput {
    key: Vec<u8>,
    ciphertext: Vec<u8>,
    iv: [u8; 12],
    tag: [u8; 16],
    aad: String,
}

fuzz_target!(|input: DecryptInput| {
    match decrypt_message(&input.ciphertext, &input.key, &input.aad, &input.iv, &input.tag) {
        // A fuzzer cannot forge a valid GCM tag; reaching Ok would
        // mean the tag check is broken.
        Ok(_) => panic!("forged ciphertext authenticated"),
        Err(CryptoError::InvalidKeyLength { expected, actual }) => {
            assert_eq!(expected, KEY_SIZE);
            assert_eq!(actual, input.key.len());
            assert_ne!(actual, KEY_SIZE);
        }
        Err(CryptoError::AuthenticationFailed) => {
            assert_eq!(input.key.len(), KEY_SIZE);
        }
    }
});
