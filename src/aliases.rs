// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret types used throughout field-redactor.

pub use secure_gate::fixed_alias;

// Fixed-size secrets
fixed_alias!(pub RedactionKey32, 32); // 256-bit AES-GCM-SIV field key
