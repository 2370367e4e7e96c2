// src/record.rs
//! Accessor-level glue over the registry
//!
//! A [`RedactedRecord`] stands in for the generated accessors of the original
//! design: it holds the backing (redacted) values a persistence layer would
//! store plus a plaintext cache. Writes go through redact-then-unredact so
//! the cache always equals what a later read from storage would reconstruct —
//! a value with a removed or digested sub-field reads back already
//! normalized instead of looking untouched until a reload.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::RedactorError;
use crate::options::{RedactionContext, RedactionOptions};
use crate::registry::AttributeRegistry;

#[derive(Debug, Clone, Default)]
pub struct RedactedRecord {
    type_key: String,
    /// Backing attribute name → stored redacted value.
    backing: HashMap<String, Value>,
    /// Source attribute name → normalized plaintext.
    cache: HashMap<String, Value>,
}

impl RedactedRecord {
    pub fn new(type_key: impl Into<String>) -> Self {
        RedactedRecord {
            type_key: type_key.into(),
            backing: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Set a logical attribute: redact, store the redacted form, then
    /// immediately unredact it back into the cache.
    pub fn write(
        &mut self,
        registry: &mut AttributeRegistry,
        attribute: &str,
        value: &Value,
        ctx: &dyn RedactionContext,
    ) -> Result<(), RedactorError> {
        let no_overrides = RedactionOptions::new();
        let redacted =
            registry.redact_attribute(&self.type_key, attribute, value, &no_overrides, ctx)?;
        let normalized =
            registry.unredact_attribute(&self.type_key, attribute, &redacted, &no_overrides, ctx)?;
        let backing_name = registry
            .config_for(&self.type_key, attribute)?
            .backing_attribute
            .clone();
        self.backing.insert(backing_name, redacted);
        self.cache.insert(attribute.to_string(), normalized);
        Ok(())
    }

    /// Read a logical attribute: cached plaintext if present, else
    /// reconstruct from the backing value and cache the result.
    pub fn read(
        &mut self,
        registry: &mut AttributeRegistry,
        attribute: &str,
        ctx: &dyn RedactionContext,
    ) -> Result<Value, RedactorError> {
        if let Some(cached) = self.cache.get(attribute) {
            return Ok(cached.clone());
        }
        let backing_name = registry
            .config_for(&self.type_key, attribute)?
            .backing_attribute
            .clone();
        let stored = self.backing.get(&backing_name).cloned().unwrap_or(Value::Null);
        let plaintext = registry.unredact_attribute(
            &self.type_key,
            attribute,
            &stored,
            &RedactionOptions::new(),
            ctx,
        )?;
        self.cache.insert(attribute.to_string(), plaintext.clone());
        Ok(plaintext)
    }

    /// The original's `attribute?` query: non-null, and non-empty for
    /// collection-like values.
    pub fn is_present(
        &mut self,
        registry: &mut AttributeRegistry,
        attribute: &str,
        ctx: &dyn RedactionContext,
    ) -> Result<bool, RedactorError> {
        let value = self.read(registry, attribute, ctx)?;
        Ok(match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Bool(b) => b,
            Value::Number(_) => true,
        })
    }

    /// Stored redacted value under a backing attribute name, if any.
    pub fn backing_value(&self, backing_attribute: &str) -> Option<&Value> {
        self.backing.get(backing_attribute)
    }

    /// Load a redacted value as a persistence layer would (e.g. after a
    /// reload). Drops any cached plaintext for attributes backed by it.
    pub fn set_backing_value(
        &mut self,
        registry: &mut AttributeRegistry,
        backing_attribute: &str,
        value: Value,
    ) {
        for attribute in registry.declared_attributes(&self.type_key) {
            let backs_it = registry
                .config_for(&self.type_key, &attribute)
                .map(|config| config.backing_attribute == backing_attribute)
                .unwrap_or(false);
            if backs_it {
                self.cache.remove(&attribute);
            }
        }
        self.backing.insert(backing_attribute.to_string(), value);
    }
}
