// src/consts.rs
//! Shared constants — derived-key naming and security parameters

/// Default prefix used to compute a backing attribute name (`redacted_data`)
pub const DEFAULT_BACKING_PREFIX: &str = "redacted_";

/// Default suffix used to compute a backing attribute name
pub const DEFAULT_BACKING_SUFFIX: &str = "";

/// Suffix appended to a field name holding its salted digest (`email_digest`)
pub const DIGEST_KEY_SUFFIX: &str = "_digest";

/// Prefix prepended to a field name holding its ciphertext (`encrypted_notes`)
pub const ENCRYPTED_KEY_PREFIX: &str = "encrypted_";

/// Suffix appended to the ciphertext key for the nonce (`encrypted_notes_iv`)
pub const NONCE_KEY_SUFFIX: &str = "_iv";

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;

/// AES-GCM-SIV nonce length in bytes (96 bits)
pub const NONCE_LEN: usize = 12;

/// Method-name prefixes recognized by dynamic dispatch
pub const REDACT_CALL_PREFIX: &str = "redact_";
pub const UNREDACT_CALL_PREFIX: &str = "unredact_";
