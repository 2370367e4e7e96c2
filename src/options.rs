// src/options.rs
//! Option layering and per-call resolution
//!
//! Options are declared in layers (built-in defaults, type-level options,
//! per-call overrides) and merged key-wise, highest layer winning. A declared
//! value may be dynamic: a named zero-argument operation on the caller's
//! context, or a closure taking the context. Resolution happens fresh on
//! every redact/unredact call and produces a call-owned [`ResolvedOptions`];
//! resolved values are never written back into shared configuration, so one
//! instance's key can never leak into another's defaults.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::aliases::RedactionKey32;
use crate::consts::{KEY_LEN, NONCE_LEN};
use crate::error::RedactorError;

/// Runtime context dynamic option values are resolved against.
///
/// `invoke` answers a named zero-argument operation (e.g. a per-instance key
/// fetch) or returns `None` when the context has no such operation.
pub trait RedactionContext {
    fn invoke(&self, method: &str) -> Option<Value>;
}

/// Context for class-level calls with no instance in scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl RedactionContext for NoContext {
    fn invoke(&self, _method: &str) -> Option<Value> {
        None
    }
}

pub type ContextFn = Arc<dyn Fn(&dyn RedactionContext) -> Value + Send + Sync>;

/// A declared option value: used literally, looked up on the context by
/// name, or computed by a closure over the context.
#[derive(Clone)]
pub enum OptionValue {
    Literal(Value),
    MethodRef(String),
    Callable(ContextFn),
}

impl OptionValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        OptionValue::Literal(value.into())
    }

    pub fn method(name: impl Into<String>) -> Self {
        OptionValue::MethodRef(name.into())
    }

    pub fn callable(f: impl Fn(&dyn RedactionContext) -> Value + Send + Sync + 'static) -> Self {
        OptionValue::Callable(Arc::new(f))
    }

    /// Resolve to a concrete value in `ctx`. Literals pass through unchanged.
    pub fn resolve(&self, ctx: &dyn RedactionContext) -> Result<Value, RedactorError> {
        match self {
            OptionValue::Literal(value) => Ok(value.clone()),
            OptionValue::MethodRef(name) => ctx
                .invoke(name)
                .ok_or_else(|| RedactorError::UnresolvedOption(name.clone())),
            OptionValue::Callable(f) => Ok(f(ctx)),
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Literal(value) => write!(f, "Literal({value})"),
            OptionValue::MethodRef(name) => write!(f, "MethodRef({name})"),
            OptionValue::Callable(_) => write!(f, "Callable(..)"),
        }
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::Literal(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Literal(Value::String(value))
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Literal(Value::Bool(value))
    }
}

/// Which transformation the resolved options will drive. Threaded as an
/// explicit argument end to end; never stored in shared configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Redact,
    Unredact,
}

/// One declared layer of options. Every slot is optional so layers merge
/// key-wise; an unset slot defers to the layer below.
#[derive(Debug, Clone, Default)]
pub struct RedactionOptions {
    pub encryption_key: Option<OptionValue>,
    pub digest_salt: Option<OptionValue>,
    pub apply_if: Option<OptionValue>,
    pub apply_unless: Option<OptionValue>,
    pub marshal_plaintext: Option<OptionValue>,
    /// Fixed nonce override. Only for deterministic tests.
    pub nonce: Option<[u8; NONCE_LEN]>,
}

impl RedactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encryption_key(mut self, value: impl Into<OptionValue>) -> Self {
        self.encryption_key = Some(value.into());
        self
    }

    pub fn digest_salt(mut self, value: impl Into<OptionValue>) -> Self {
        self.digest_salt = Some(value.into());
        self
    }

    pub fn apply_if(mut self, value: impl Into<OptionValue>) -> Self {
        self.apply_if = Some(value.into());
        self
    }

    pub fn apply_unless(mut self, value: impl Into<OptionValue>) -> Self {
        self.apply_unless = Some(value.into());
        self
    }

    pub fn marshal_plaintext(mut self, value: impl Into<OptionValue>) -> Self {
        self.marshal_plaintext = Some(value.into());
        self
    }

    pub fn nonce(mut self, nonce: [u8; NONCE_LEN]) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Shallow key-wise override: any slot set in `over` wins.
    pub fn merge(&self, over: &RedactionOptions) -> RedactionOptions {
        RedactionOptions {
            encryption_key: over
                .encryption_key
                .clone()
                .or_else(|| self.encryption_key.clone()),
            digest_salt: over.digest_salt.clone().or_else(|| self.digest_salt.clone()),
            apply_if: over.apply_if.clone().or_else(|| self.apply_if.clone()),
            apply_unless: over
                .apply_unless
                .clone()
                .or_else(|| self.apply_unless.clone()),
            marshal_plaintext: over
                .marshal_plaintext
                .clone()
                .or_else(|| self.marshal_plaintext.clone()),
            nonce: over.nonce.or(self.nonce),
        }
    }
}

/// Fully resolved, call-owned options. The key zeroizes on drop.
#[derive(Debug)]
pub struct ResolvedOptions {
    pub(crate) encryption_key: Option<RedactionKey32>,
    pub digest_salt: String,
    pub apply_if: bool,
    pub apply_unless: bool,
    pub marshal_plaintext: bool,
    pub nonce: Option<[u8; NONCE_LEN]>,
    pub operation: Operation,
}

impl ResolvedOptions {
    /// Effective gate: when closed, redact/unredact are the identity.
    pub fn gate_open(&self) -> bool {
        self.apply_if && !self.apply_unless
    }

    pub(crate) fn require_key(&self, field: &str) -> Result<&RedactionKey32, RedactorError> {
        self.encryption_key
            .as_ref()
            .ok_or_else(|| RedactorError::MissingEncryptionKey(field.to_string()))
    }
}

/// Merge `declared` under `call` and resolve every dynamic value in `ctx`.
///
/// Built-in defaults sit below both layers: gate open, empty salt, no
/// marshalling, no key, no fixed nonce.
pub fn resolve(
    declared: &RedactionOptions,
    call: &RedactionOptions,
    operation: Operation,
    ctx: &dyn RedactionContext,
) -> Result<ResolvedOptions, RedactorError> {
    let merged = declared.merge(call);

    let apply_if = match &merged.apply_if {
        Some(value) => truthy(&value.resolve(ctx)?),
        None => true,
    };
    let apply_unless = match &merged.apply_unless {
        Some(value) => truthy(&value.resolve(ctx)?),
        None => false,
    };
    let marshal_plaintext = match &merged.marshal_plaintext {
        Some(value) => truthy(&value.resolve(ctx)?),
        None => false,
    };
    let digest_salt = match &merged.digest_salt {
        Some(value) => salt_string(value.resolve(ctx)?)?,
        None => String::new(),
    };
    let encryption_key = match &merged.encryption_key {
        Some(value) => key_from_value(value.resolve(ctx)?)?,
        None => None,
    };

    Ok(ResolvedOptions {
        encryption_key,
        digest_salt,
        apply_if,
        apply_unless,
        marshal_plaintext,
        nonce: merged.nonce,
        operation,
    })
}

// Source-language truthiness: only null and false are false.
fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn salt_string(value: Value) -> Result<String, RedactorError> {
    match value {
        Value::String(salt) => Ok(salt),
        Value::Null => Ok(String::new()),
        other => Err(RedactorError::Config(format!(
            "digest_salt must be a string, got {other}"
        ))),
    }
}

fn key_from_value(value: Value) -> Result<Option<RedactionKey32>, RedactorError> {
    match value {
        Value::Null => Ok(None),
        Value::String(key) => Ok(Some(key_from_bytes(key.as_bytes()))),
        other => Err(RedactorError::Config(format!(
            "encryption_key must be a string, got {other}"
        ))),
    }
}

/// 32 bytes are used as-is; anything else is digested once with SHA-256 so
/// arbitrary-length key strings stay usable.
fn key_from_bytes(bytes: &[u8]) -> RedactionKey32 {
    if bytes.len() == KEY_LEN {
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        RedactionKey32::new(key)
    } else {
        RedactionKey32::new(Sha256::digest(bytes).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secure_gate::RevealSecret;
    use serde_json::json;

    struct FakeInstance;

    impl RedactionContext for FakeInstance {
        fn invoke(&self, method: &str) -> Option<Value> {
            match method {
                "secret_key" => Some(json!("instance key, fetched at call time")),
                "skip_redaction" => Some(json!(true)),
                _ => None,
            }
        }
    }

    #[test]
    fn call_layer_overrides_declared_layer() {
        let declared = RedactionOptions::new().digest_salt("class salt");
        let call = RedactionOptions::new().digest_salt("call salt");
        let resolved = resolve(&declared, &call, Operation::Redact, &NoContext).unwrap();
        assert_eq!(resolved.digest_salt, "call salt");
    }

    #[test]
    fn unset_call_slot_defers_to_declared_layer() {
        let declared = RedactionOptions::new().digest_salt("class salt");
        let resolved = resolve(
            &declared,
            &RedactionOptions::new(),
            Operation::Redact,
            &NoContext,
        )
        .unwrap();
        assert_eq!(resolved.digest_salt, "class salt");
    }

    #[test]
    fn built_in_defaults_open_the_gate() {
        let resolved = resolve(
            &RedactionOptions::new(),
            &RedactionOptions::new(),
            Operation::Redact,
            &NoContext,
        )
        .unwrap();
        assert!(resolved.gate_open());
        assert!(resolved.digest_salt.is_empty());
        assert!(resolved.encryption_key.is_none());
        assert!(!resolved.marshal_plaintext);
    }

    #[test]
    fn method_ref_resolves_on_the_context() {
        let declared = RedactionOptions::new().encryption_key(OptionValue::method("secret_key"));
        let resolved = resolve(
            &declared,
            &RedactionOptions::new(),
            Operation::Redact,
            &FakeInstance,
        )
        .unwrap();
        assert!(resolved.encryption_key.is_some());
    }

    #[test]
    fn unknown_method_ref_is_an_unresolved_option() {
        let declared = RedactionOptions::new().digest_salt(OptionValue::method("no_such_method"));
        let err = resolve(
            &declared,
            &RedactionOptions::new(),
            Operation::Redact,
            &FakeInstance,
        )
        .unwrap_err();
        assert!(matches!(err, RedactorError::UnresolvedOption(name) if name == "no_such_method"));
    }

    #[test]
    fn callable_receives_the_context() {
        let declared = RedactionOptions::new().apply_unless(OptionValue::callable(|ctx| {
            ctx.invoke("skip_redaction").unwrap_or(Value::Bool(false))
        }));
        let resolved = resolve(
            &declared,
            &RedactionOptions::new(),
            Operation::Unredact,
            &FakeInstance,
        )
        .unwrap();
        assert!(!resolved.gate_open());
    }

    #[test]
    fn string_literal_is_used_verbatim() {
        let value = OptionValue::literal("SomeOtherClass");
        assert_eq!(value.resolve(&NoContext).unwrap(), json!("SomeOtherClass"));
    }

    #[test]
    fn truthiness_matches_source_semantics() {
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(false)));
        assert!(truthy(&json!(0)));
        assert!(truthy(&json!("")));
    }

    #[test]
    fn short_and_long_keys_are_derived_not_rejected() {
        assert!(key_from_value(json!("short")).unwrap().is_some());
        let exact = "0123456789abcdef0123456789abcdef";
        let key = key_from_value(json!(exact)).unwrap().unwrap();
        assert_eq!(key.expose_secret().as_slice(), exact.as_bytes());
    }
}
