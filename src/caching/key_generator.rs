//! # Cache Key Generator
//!
//! Deterministic cache keys built from an operation name and its parameters.
//!
//! Keys look like `verse:2:255:en.asad`: the operation name followed by the
//! operation's parameters in a fixed order. Every positional segment is
//! trimmed and lower-cased, so `EN.Asad ` and `en.asad` share an entry, and
//! `:` inside a value is percent-escaped so it cannot pose as a separator.
//! Filter objects are rendered as canonical JSON (object keys sorted, nulls
//! dropped) so two equivalent filters never fragment the cache no matter how
//! the caller assembled them.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::resolver::Operation;

/// Default upper bound on key length before hashing kicks in
pub const DEFAULT_MAX_KEY_LENGTH: usize = 250;

/// A stable cache key for one resolver invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Start a key for `operation`
    pub fn builder(operation: Operation) -> CacheKeyBuilder {
        CacheKeyBuilder {
            operation,
            segments: vec![operation.name().to_string()],
            max_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder collecting the ordered parameters of a key
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    operation: Operation,
    segments: Vec<String>,
    max_length: usize,
}

impl CacheKeyBuilder {
    /// Append a positional parameter
    pub fn segment(mut self, value: impl fmt::Display) -> Self {
        self.segments.push(escape_segment(&value.to_string()));
        self
    }

    /// Append an optional positional parameter; absent values keep their slot
    pub fn optional(self, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.segment(value),
            None => self.segment("-"),
        }
    }

    /// Append a filter object as canonical JSON
    pub fn filter<T: Serialize>(mut self, filter: &T) -> Self {
        let rendered = match serde_json::to_value(filter) {
            Ok(value) => canonical_json(&value),
            // Serializing plain filter structs cannot fail; keep the key
            // deterministic anyway.
            Err(_) => "null".to_string(),
        };
        self.segments.push(rendered);
        self
    }

    /// Override the maximum key length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn build(self) -> CacheKey {
        let key = self.segments.join(":");
        if key.len() <= self.max_length {
            return CacheKey(key);
        }

        // Long keys are hashed so every store accepts them
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        CacheKey(format!(
            "{}:sha256:{}",
            self.operation.name(),
            hex::encode(hasher.finalize())
        ))
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn escape_segment(value: &str) -> String {
    normalize(value).replace('%', "%25").replace(':', "%3A")
}

/// Render a JSON value with sorted object keys and without null members
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().filter(|(_, v)| !v.is_null()).collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => out.push_str(&Value::String(normalize(s)).to_string()),
        other => out.push_str(&other.to_string()),
    }
}
