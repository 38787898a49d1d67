//! Certification transactions.
//!
//! A transaction is an opaque mapping of string keys to JSON values; the
//! ledger core preserves it byte-for-byte and hashes it canonically but never
//! interprets its schema. A couple of well-known fields (`status`, `from`,
//! `to`, `timestamp`) have accessors because chain-level queries and the pool
//! use them by convention.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field stamped by the pool at submission time when absent.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Status value marking a certification as granted.
pub const STATUS_VALIDATED: &str = "validated";

/// An opaque key/value transaction payload.
///
/// Keys are kept in sorted order (the underlying map is BTree-backed), which
/// is what makes block hashing independent of construction order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Map<String, Value>);

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Check whether a field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether the `status` field marks this certification as granted.
    pub fn is_certified(&self) -> bool {
        self.get("status").and_then(Value::as_str) == Some(STATUS_VALIDATED)
    }

    /// Whether the transaction's `from` or `to` field matches an address.
    pub fn involves(&self, address: &str) -> bool {
        let matches = |key| self.get(key).and_then(Value::as_str) == Some(address);
        matches("from") || matches("to")
    }
}

impl From<Map<String, Value>> for Transaction {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
