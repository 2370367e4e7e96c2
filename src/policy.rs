// src/policy.rs
//! Per-field policy engine
//!
//! Applies one policy to one field value and derives the mapping keys the
//! redacted form uses. Pure functions: all state arrives through
//! [`ResolvedOptions`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{DIGEST_KEY_SUFFIX, ENCRYPTED_KEY_PREFIX, NONCE_KEY_SUFFIX, NONCE_LEN};
use crate::crypto;
use crate::error::RedactorError;
use crate::options::ResolvedOptions;

/// What happens to a single field. Fields absent from a policy map are
/// `Keep` (passed through unchanged).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Drop the field entirely. Irreversible by design.
    Remove,
    /// Replace with a salted one-way digest under `<field>_digest`.
    Digest,
    /// Replace with `encrypted_<field>` + `encrypted_<field>_iv`.
    Encrypt,
    /// Pass through unchanged.
    #[default]
    Keep,
}

/// Derived key holding a field's digest
pub fn digest_key(field: &str) -> String {
    format!("{field}{DIGEST_KEY_SUFFIX}")
}

/// Derived key holding a field's ciphertext
pub fn encrypted_key(field: &str) -> String {
    format!("{ENCRYPTED_KEY_PREFIX}{field}")
}

/// Derived key holding a field's nonce
pub fn nonce_key(field: &str) -> String {
    format!("{ENCRYPTED_KEY_PREFIX}{field}{NONCE_KEY_SUFFIX}")
}

/// Canonical string form of a value: strings keep their raw content,
/// everything else uses its JSON rendering.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Apply `policy` to one field, yielding the key/value pairs the redacted
/// mapping will carry for it.
pub fn apply(
    policy: FieldPolicy,
    field: &str,
    value: &Value,
    opts: &ResolvedOptions,
) -> Result<Vec<(String, Value)>, RedactorError> {
    match policy {
        FieldPolicy::Keep => Ok(vec![(field.to_string(), value.clone())]),
        FieldPolicy::Remove => Ok(Vec::new()),
        FieldPolicy::Digest => {
            let hash = crypto::digest(&opts.digest_salt, &stringify(value));
            Ok(vec![(digest_key(field), Value::String(hash))])
        }
        FieldPolicy::Encrypt => {
            let key = opts.require_key(field)?;
            let nonce = opts.nonce.unwrap_or_else(crypto::generate_nonce);
            let plaintext = if opts.marshal_plaintext {
                serde_json::to_vec(value)
                    .map_err(|e| RedactorError::Config(format!("field `{field}`: {e}")))?
            } else {
                stringify(value).into_bytes()
            };
            let ciphertext = crypto::encrypt(key, &nonce, &plaintext)?;
            Ok(vec![
                (encrypted_key(field), Value::String(STANDARD.encode(ciphertext))),
                (nonce_key(field), Value::String(STANDARD.encode(nonce))),
            ])
        }
    }
}

/// Recover one field from a redacted mapping, or `None` when the policy is
/// irreversible or the derived keys are missing (a newly declared field on a
/// pre-existing record is absence, not an error).
pub fn reverse(
    policy: FieldPolicy,
    field: &str,
    redacted: &Map<String, Value>,
    opts: &ResolvedOptions,
) -> Result<Option<Value>, RedactorError> {
    match policy {
        FieldPolicy::Keep => Ok(redacted.get(field).cloned()),
        FieldPolicy::Remove | FieldPolicy::Digest => Ok(None),
        FieldPolicy::Encrypt => {
            let (Some(ciphertext), Some(nonce)) =
                (redacted.get(&encrypted_key(field)), redacted.get(&nonce_key(field)))
            else {
                return Ok(None);
            };
            let key = opts.require_key(field)?;
            let ciphertext = decode_b64(field, ciphertext, "ciphertext")?;
            let nonce = decode_nonce(field, &decode_b64(field, nonce, "nonce")?)?;
            let plaintext = crypto::decrypt(key, &nonce, &ciphertext)?;
            if opts.marshal_plaintext {
                serde_json::from_slice(&plaintext)
                    .map_err(|_| RedactorError::decryption(field, "plaintext is not valid JSON"))
                    .map(Some)
            } else {
                String::from_utf8(plaintext)
                    .map(|text| Some(Value::String(text)))
                    .map_err(|_| RedactorError::decryption(field, "plaintext is not valid UTF-8"))
            }
        }
    }
}

fn decode_b64(field: &str, value: &Value, what: &str) -> Result<Vec<u8>, RedactorError> {
    let Value::String(encoded) = value else {
        return Err(RedactorError::decryption(field, &format!("{what} is not a string")));
    };
    STANDARD
        .decode(encoded)
        .map_err(|_| RedactorError::decryption(field, &format!("{what} is not valid base64")))
}

fn decode_nonce(field: &str, bytes: &[u8]) -> Result<[u8; NONCE_LEN], RedactorError> {
    bytes
        .try_into()
        .map_err(|_| RedactorError::decryption(field, "nonce has the wrong length"))
}
