// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedactorError {
    /// An `encrypt` policy is active but no encryption key was configured.
    /// Raised at the first crypto call, never at declaration time.
    #[error("field `{0}` requires an encryption key but none was configured")]
    MissingEncryptionKey(String),

    /// Bad configuration: non-mapping input, unusable key material, etc.
    #[error("configuration error: {0}")]
    Config(String),

    /// Ciphertext or nonce malformed, or authentication failed.
    /// The engine never returns unauthenticated plaintext.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A dynamic option named a method the context does not answer.
    #[error("option `{0}` could not be resolved in this context")]
    UnresolvedOption(String),

    /// A dynamic-dispatch name matched no declared attribute. Propagated as
    /// "not handled" so collaborators can run their own fallback.
    #[error("no redacted attribute handles `{0}`")]
    UnsupportedOperation(String),

    /// The named type or attribute was never declared.
    #[error("attribute `{attribute}` is not declared on type `{type_key}`")]
    UnknownAttribute { type_key: String, attribute: String },
}

impl RedactorError {
    pub(crate) fn decryption(field: &str, reason: &str) -> Self {
        RedactorError::Decryption(format!("field `{field}`: {reason}"))
    }
}
