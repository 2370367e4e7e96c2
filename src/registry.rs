// src/registry.rs
//! Attribute configuration registry
//!
//! Process-wide configuration keyed by type. Types form an explicit arena
//! with parent links; a type with no configuration of its own materializes a
//! copy of its nearest configured ancestor on first access (value copy, not
//! a shared reference) and owns it independently from then on.
//!
//! Dynamic names like `redact_data` are handled by an explicit parser plus a
//! registry lookup — no reflection. Unmatched names surface as
//! [`RedactorError::UnsupportedOperation`] so callers can run their own
//! fallback.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use serde_json::Value;

#[cfg(feature = "logging")]
use tracing::debug;

use crate::consts::{
    DEFAULT_BACKING_PREFIX, DEFAULT_BACKING_SUFFIX, REDACT_CALL_PREFIX, UNREDACT_CALL_PREFIX,
};
use crate::engine::{self, FieldPolicies};
use crate::error::RedactorError;
use crate::options::{resolve, Operation, RedactionContext, RedactionOptions};

/// How a declared attribute's backing attribute name is computed.
#[derive(Debug, Clone)]
pub enum BackingName {
    /// `prefix + attribute + suffix`
    Derived { prefix: String, suffix: String },
    /// An explicit name override.
    Explicit(String),
}

impl Default for BackingName {
    fn default() -> Self {
        BackingName::Derived {
            prefix: DEFAULT_BACKING_PREFIX.to_string(),
            suffix: DEFAULT_BACKING_SUFFIX.to_string(),
        }
    }
}

impl BackingName {
    pub fn affix(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        BackingName::Derived {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn explicit(name: impl Into<String>) -> Self {
        BackingName::Explicit(name.into())
    }

    fn compute(&self, attribute: &str) -> String {
        match self {
            BackingName::Derived { prefix, suffix } => format!("{prefix}{attribute}{suffix}"),
            BackingName::Explicit(name) => name.clone(),
        }
    }
}

/// One declared redacted attribute.
#[derive(Debug, Clone)]
pub struct AttributeConfig {
    pub source_attribute: String,
    pub backing_attribute: String,
    pub policies: FieldPolicies,
    pub options: RedactionOptions,
}

#[derive(Debug, Clone, Default)]
struct TypeState {
    default_options: RedactionOptions,
    attributes: HashMap<String, AttributeConfig>,
}

#[derive(Debug, Clone, Default)]
struct TypeRecord {
    parent: Option<String>,
    /// `None` until first declaration or query materializes a copy of the
    /// nearest configured ancestor.
    state: Option<TypeState>,
}

#[derive(Debug, Default)]
pub struct AttributeRegistry {
    types: HashMap<String, TypeRecord>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a type and its parent link. Idempotent for the same parent;
    /// root types may skip this and are registered on first declaration.
    pub fn register_type(&mut self, type_key: &str, parent: Option<&str>) {
        let record = self.types.entry(type_key.to_string()).or_default();
        if let Some(parent) = parent {
            record.parent = Some(parent.to_string());
        }
    }

    /// Merge extra slots into the type-level default options, the options
    /// every later declaration on this type starts from.
    pub fn merge_default_options(&mut self, type_key: &str, options: &RedactionOptions) {
        self.materialize(type_key);
        let state = self.state_mut(type_key);
        state.default_options = state.default_options.merge(options);
    }

    /// Type-level default options as currently materialized.
    pub fn default_options(&mut self, type_key: &str) -> RedactionOptions {
        self.materialize(type_key);
        self.state_mut(type_key).default_options.clone()
    }

    /// Declare a redacted attribute on a type.
    ///
    /// The declared options are layered over the type's default options once,
    /// here; later changes to the defaults do not reach existing attributes.
    pub fn declare(
        &mut self,
        type_key: &str,
        attribute: &str,
        policies: FieldPolicies,
        options: RedactionOptions,
        naming: BackingName,
    ) {
        self.materialize(type_key);
        let backing_attribute = naming.compute(attribute);

        #[cfg(feature = "logging")]
        debug!(type_key, attribute, backing = %backing_attribute, "declaring redacted attribute");

        let state = self.state_mut(type_key);
        let options = state.default_options.merge(&options);
        state.attributes.insert(
            attribute.to_string(),
            AttributeConfig {
                source_attribute: attribute.to_string(),
                backing_attribute,
                policies,
                options,
            },
        );
    }

    /// Whether `attribute` is declared on `type_key` (own or inherited).
    pub fn is_declared(&mut self, type_key: &str, attribute: &str) -> bool {
        self.materialize(type_key);
        self.state_mut(type_key).attributes.contains_key(attribute)
    }

    /// Declared attribute names, own and inherited.
    pub fn declared_attributes(&mut self, type_key: &str) -> Vec<String> {
        self.materialize(type_key);
        let mut names: Vec<String> = self.state_mut(type_key).attributes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn config_for(
        &mut self,
        type_key: &str,
        attribute: &str,
    ) -> Result<&AttributeConfig, RedactorError> {
        self.materialize(type_key);
        self.state_mut(type_key)
            .attributes
            .get(attribute)
            .ok_or_else(|| RedactorError::UnknownAttribute {
                type_key: type_key.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Mutable access to a declared attribute's configuration. After
    /// materialization this is the type's own copy, so edits never reach the
    /// parent type.
    pub fn config_mut(
        &mut self,
        type_key: &str,
        attribute: &str,
    ) -> Result<&mut AttributeConfig, RedactorError> {
        self.materialize(type_key);
        self.state_mut(type_key)
            .attributes
            .get_mut(attribute)
            .ok_or_else(|| RedactorError::UnknownAttribute {
                type_key: type_key.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Redact `value` for a declared attribute, resolving options in `ctx`.
    pub fn redact_attribute(
        &mut self,
        type_key: &str,
        attribute: &str,
        value: &Value,
        call_options: &RedactionOptions,
        ctx: &dyn RedactionContext,
    ) -> Result<Value, RedactorError> {
        self.transform(Operation::Redact, type_key, attribute, value, call_options, ctx)
    }

    /// Reverse of [`redact_attribute`](Self::redact_attribute).
    pub fn unredact_attribute(
        &mut self,
        type_key: &str,
        attribute: &str,
        value: &Value,
        call_options: &RedactionOptions,
        ctx: &dyn RedactionContext,
    ) -> Result<Value, RedactorError> {
        self.transform(Operation::Unredact, type_key, attribute, value, call_options, ctx)
    }

    fn transform(
        &mut self,
        operation: Operation,
        type_key: &str,
        attribute: &str,
        value: &Value,
        call_options: &RedactionOptions,
        ctx: &dyn RedactionContext,
    ) -> Result<Value, RedactorError> {
        let config = self.config_for(type_key, attribute)?;
        // Resolution output is owned by this call; the stored config is
        // never touched.
        let resolved = resolve(&config.options, call_options, operation, ctx)?;
        match operation {
            Operation::Redact => engine::redact(value, &config.policies, &resolved),
            Operation::Unredact => engine::unredact(value, &config.policies, &resolved),
        }
    }

    /// Route a synthesized method name (`redact_<attr>` / `unredact_<attr>`)
    /// to the matching transformation.
    pub fn dispatch(
        &mut self,
        type_key: &str,
        method: &str,
        value: &Value,
        call_options: &RedactionOptions,
        ctx: &dyn RedactionContext,
    ) -> Result<Value, RedactorError> {
        let Some((operation, attribute)) = parse_dynamic_call(method) else {
            return Err(RedactorError::UnsupportedOperation(method.to_string()));
        };
        if !self.is_declared(type_key, attribute) {
            return Err(RedactorError::UnsupportedOperation(method.to_string()));
        }
        match operation {
            Operation::Redact => {
                self.redact_attribute(type_key, attribute, value, call_options, ctx)
            }
            Operation::Unredact => {
                self.unredact_attribute(type_key, attribute, value, call_options, ctx)
            }
        }
    }

    /// Copy-on-first-access: give `type_key` its own state, cloned from the
    /// nearest materialized ancestor (or empty for a root).
    fn materialize(&mut self, type_key: &str) {
        if self
            .types
            .get(type_key)
            .is_some_and(|record| record.state.is_some())
        {
            return;
        }

        let mut inherited: Option<TypeState> = None;
        let mut cursor = self.types.get(type_key).and_then(|r| r.parent.clone());
        while let Some(ancestor) = cursor {
            let Some(record) = self.types.get(&ancestor) else {
                break;
            };
            if let Some(state) = &record.state {
                inherited = Some(state.clone());
                break;
            }
            cursor = record.parent.clone();
        }

        let record = self.types.entry(type_key.to_string()).or_default();
        record.state = Some(inherited.unwrap_or_default());
    }

    fn state_mut(&mut self, type_key: &str) -> &mut TypeState {
        self.types
            .get_mut(type_key)
            .and_then(|record| record.state.as_mut())
            .expect("state exists after materialize")
    }
}

/// Parse a synthesized method name into its operation and attribute.
pub fn parse_dynamic_call(method: &str) -> Option<(Operation, &str)> {
    if let Some(attribute) = method.strip_prefix(UNREDACT_CALL_PREFIX) {
        Some((Operation::Unredact, attribute))
    } else {
        method
            .strip_prefix(REDACT_CALL_PREFIX)
            .map(|attribute| (Operation::Redact, attribute))
    }
}

/// The process-wide registry. Declaration normally happens once at startup;
/// all access is serialized through the mutex.
pub fn global() -> &'static Mutex<AttributeRegistry> {
    static GLOBAL: Lazy<Mutex<AttributeRegistry>> = Lazy::new(|| Mutex::new(AttributeRegistry::new()));
    &GLOBAL
}
