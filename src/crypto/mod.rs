// src/crypto/mod.rs
//! Pure cryptographic primitives — no I/O, no shared state
//!
//! Everything here works on in-memory buffers: a salted one-way digest for
//! equality-comparable fields and AES-256-GCM-SIV for reversible ones.

pub mod decrypt;
pub mod digest;
pub mod encrypt;

pub use decrypt::decrypt;
pub use digest::digest;
pub use encrypt::{encrypt, generate_nonce};

use aes_gcm_siv::{aead::KeyInit, Aes256GcmSiv};
use secure_gate::RevealSecret;

use crate::aliases::RedactionKey32;
use crate::error::RedactorError;

/// Build an AES-256-GCM-SIV cipher from a 256-bit key
pub(crate) fn build_cipher(key: &RedactionKey32) -> Result<Aes256GcmSiv, RedactorError> {
    Aes256GcmSiv::new_from_slice(key.expose_secret())
        .map_err(|_| RedactorError::Config("encryption key must be 32 bytes".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NONCE_LEN;

    fn test_key() -> RedactionKey32 {
        RedactionKey32::new([7u8; 32])
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key = test_key();
        let nonce = generate_nonce();
        let ciphertext = encrypt(&key, &nonce, b"very private").unwrap();
        let plaintext = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(plaintext, b"very private");
    }

    #[test]
    fn fresh_nonces_differ() {
        assert_ne!(generate_nonce(), generate_nonce());
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let key = test_key();
        let nonce = [0u8; NONCE_LEN];
        let mut ciphertext = encrypt(&key, &nonce, b"payload").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(decrypt(&key, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let nonce = [0u8; NONCE_LEN];
        let ciphertext = encrypt(&test_key(), &nonce, b"payload").unwrap();
        let other = RedactionKey32::new([9u8; 32]);
        assert!(decrypt(&other, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn digest_is_deterministic_and_salt_sensitive() {
        assert_eq!(digest("s", "a@b.com"), digest("s", "a@b.com"));
        assert_ne!(digest("s", "a@b.com"), digest("t", "a@b.com"));
        assert_ne!(digest("s", "a@b.com"), digest("s", "b@b.com"));
    }
}
