// src/engine.rs
//! Whole-mapping redaction engine
//!
//! Applies a full policy map to a mapping. A closed gate or a `Null`
//! mapping passes through untouched — absence of data is never an error.

use std::collections::HashMap;

use serde_json::{Map, Value};

#[cfg(feature = "logging")]
use tracing::debug;

use crate::error::RedactorError;
use crate::options::ResolvedOptions;
use crate::policy::{self, FieldPolicy};

/// Field name → policy. Undeclared fields default to [`FieldPolicy::Keep`].
pub type FieldPolicies = HashMap<String, FieldPolicy>;

/// Transform a plaintext mapping into its redacted form.
pub fn redact(
    mapping: &Value,
    policies: &FieldPolicies,
    opts: &ResolvedOptions,
) -> Result<Value, RedactorError> {
    if !opts.gate_open() || mapping.is_null() {
        return Ok(mapping.clone());
    }
    let map = as_mapping(mapping)?;

    #[cfg(feature = "logging")]
    debug!(fields = map.len(), "redacting mapping");

    let mut out = Map::new();
    for (field, value) in map {
        let policy = policies.get(field).copied().unwrap_or_default();
        for (key, redacted_value) in policy::apply(policy, field, value, opts)? {
            out.insert(key, redacted_value);
        }
    }
    Ok(Value::Object(out))
}

/// Reconstruct a plaintext mapping from its redacted form.
///
/// Every reversible field is recovered; removed fields stay absent and
/// digested fields stay in digest form. Keep fields — declared or not —
/// copy through.
pub fn unredact(
    redacted: &Value,
    policies: &FieldPolicies,
    opts: &ResolvedOptions,
) -> Result<Value, RedactorError> {
    if !opts.gate_open() || redacted.is_null() {
        return Ok(redacted.clone());
    }
    let map = as_mapping(redacted)?;

    #[cfg(feature = "logging")]
    debug!(fields = map.len(), "unredacting mapping");

    let mut out = map.clone();
    for (field, policy) in policies {
        match policy {
            FieldPolicy::Keep => {}
            // The plain key must never resurface for irreversible policies,
            // even if a hand-built redacted mapping carries one.
            FieldPolicy::Remove | FieldPolicy::Digest => {
                out.remove(field);
            }
            FieldPolicy::Encrypt => {
                if let Some(value) = policy::reverse(*policy, field, map, opts)? {
                    out.remove(&policy::encrypted_key(field));
                    out.remove(&policy::nonce_key(field));
                    out.insert(field.clone(), value);
                }
            }
        }
    }
    Ok(Value::Object(out))
}

fn as_mapping(value: &Value) -> Result<&Map<String, Value>, RedactorError> {
    value
        .as_object()
        .ok_or_else(|| RedactorError::Config("redaction input must be a mapping or null".into()))
}
