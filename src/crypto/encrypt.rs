// src/crypto/encrypt.rs
use aes_gcm_siv::aead::rand_core::RngCore;
use aes_gcm_siv::aead::{Aead, OsRng};
use aes_gcm_siv::Nonce;

use crate::aliases::RedactionKey32;
use crate::consts::NONCE_LEN;
use crate::crypto::build_cipher;
use crate::error::RedactorError;

/// Generate a fresh 96-bit nonce from the OS CSPRNG
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt plaintext → AES-256-GCM-SIV ciphertext + tag (in-memory)
pub fn encrypt(
    key: &RedactionKey32,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, RedactorError> {
    let cipher = build_cipher(key)?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| RedactorError::Config("aead encryption failed".into()))
}
