// src/crypto/digest.rs
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Salted one-way digest of a field value → lowercase hex
///
/// Deterministic: the same `(salt, text)` always yields the same output, so
/// digested fields stay usable for equality lookups. HMAC keyed by the salt
/// rather than plain `SHA256(salt || text)` to rule out extension tricks.
pub fn digest(salt: &str, text: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(text.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
