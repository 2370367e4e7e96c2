// src/crypto/decrypt.rs
use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::Nonce;

use crate::aliases::RedactionKey32;
use crate::consts::NONCE_LEN;
use crate::crypto::build_cipher;
use crate::error::RedactorError;

/// Decrypt AES-256-GCM-SIV ciphertext → plaintext (in-memory)
///
/// Fails when the authentication tag does not verify — a wrong key, a wrong
/// nonce or a single flipped ciphertext byte all surface as
/// [`RedactorError::Decryption`], never as garbage plaintext.
pub fn decrypt(
    key: &RedactionKey32,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, RedactorError> {
    let cipher = build_cipher(key)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| RedactorError::Decryption("authentication failed".into()))
}
