//! Typed, fallible access to weakly-typed webhook payloads.
//!
//! Onedev does not publish a schema for its webhook bodies, so the formatter
//! reads individual fields by path instead of deserializing into structs.
//! Every read names the type it expects; a missing key or a value of the
//! wrong JSON kind fails with a [`FieldExtractionError`] carrying the full
//! path, so the caller can reject the request with a precise message.
//!
//! Paths are dot-separated key sequences into nested objects, for example
//! `"project.name"` reads `{"project": {"name": "..."}}`. Keys may contain
//! `@` (Onedev uses `@class` and `@type` as type tags).
//!
//! # Examples
//!
//! ```rust
//! use onedev_relay_core::webhook::payload::Payload;
//! use serde_json::json;
//!
//! let value = json!({ "issue": { "number": 7, "description": null } });
//! let payload = Payload::new(&value);
//!
//! assert_eq!(payload.get_int("issue.number").unwrap(), 7);
//! assert_eq!(payload.get_optional_str("issue.description").unwrap(), None);
//! assert!(payload.get_str("issue.title").is_err());
//! ```

use serde_json::Value;

/// Failure to read a required field from a payload.
///
/// Both variants are data-contract violations by the sending platform and
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldExtractionError {
    #[error("Required field missing: {path}")]
    MissingField { path: String },

    #[error("Invalid field type at {path}: expected {expected}, found {found}")]
    InvalidType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldExtractionError {
    /// Path of the field that could not be read
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path } => path,
            Self::InvalidType { path, .. } => path,
        }
    }
}

/// Read-only view over a parsed webhook body.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    root: &'a Value,
}

impl<'a> Payload<'a> {
    /// Wrap a parsed JSON value
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Look up a path without any type check.
    ///
    /// Returns `None` when any segment is missing or an intermediate value
    /// is not an object.
    pub fn get_optional_at(&self, path: &str) -> Option<&'a Value> {
        path.split('.')
            .try_fold(self.root, |current, key| current.as_object()?.get(key))
    }

    /// Read a required string field.
    ///
    /// # Errors
    ///
    /// [`FieldExtractionError::MissingField`] when the path does not exist,
    /// [`FieldExtractionError::InvalidType`] when the value is not a string
    /// (including `null`).
    pub fn get_str(&self, path: &str) -> Result<&'a str, FieldExtractionError> {
        let value = self.require(path)?;
        value
            .as_str()
            .ok_or_else(|| invalid_type(path, "string", value))
    }

    /// Read a required integer field.
    ///
    /// Only JSON integers that fit in an `i64` are accepted; floats and
    /// numeric strings are type errors.
    pub fn get_int(&self, path: &str) -> Result<i64, FieldExtractionError> {
        let value = self.require(path)?;
        value
            .as_i64()
            .ok_or_else(|| invalid_type(path, "integer", value))
    }

    /// Read an optional string field.
    ///
    /// An absent key and an explicit `null` both yield `Ok(None)`. A present
    /// value of any other non-string kind is still an error.
    pub fn get_optional_str(&self, path: &str) -> Result<Option<&'a str>, FieldExtractionError> {
        match self.get_optional_at(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid_type(path, "string or null", other)),
        }
    }

    fn require(&self, path: &str) -> Result<&'a Value, FieldExtractionError> {
        self.get_optional_at(path)
            .ok_or_else(|| FieldExtractionError::MissingField {
                path: path.to_string(),
            })
    }
}

/// Name of a JSON value's kind, as used in error messages
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(path: &str, expected: &'static str, found: &Value) -> FieldExtractionError {
    FieldExtractionError::InvalidType {
        path: path.to_string(),
        expected,
        found: json_kind(found),
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
