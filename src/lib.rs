// src/lib.rs
//! field-redactor — per-field redaction of attribute mappings
//!
//! Features:
//! - Remove, digest, encrypt or keep each field of a mapping independently
//! - AES-256-GCM-SIV field encryption with a fresh nonce per call
//! - Salted HMAC-SHA256 digests for equality-comparable one-way fields
//! - Layered options with per-call dynamic resolution
//! - Type-keyed attribute registry with copy-on-first-access inheritance

pub mod aliases;
pub mod consts;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod options;
pub mod policy;
pub mod record;
pub mod registry;

// Re-export everything users need at the crate root
pub use aliases::RedactionKey32;
pub use engine::{redact, unredact, FieldPolicies};
pub use error::RedactorError;
pub use options::{
    resolve, NoContext, Operation, OptionValue, RedactionContext, RedactionOptions,
    ResolvedOptions,
};
pub use policy::FieldPolicy;
pub use record::RedactedRecord;
pub use registry::{global, AttributeConfig, AttributeRegistry, BackingName};

pub type Result<T> = std::result::Result<T, RedactorError>;
