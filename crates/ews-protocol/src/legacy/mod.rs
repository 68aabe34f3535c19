//! Legacy structured form (JSON object encoding).
//!
//! Before the XML codec became primary, complex properties were exchanged as
//! JSON objects. [`LegacyObject`] is the ordered key/value container used for
//! that encoding: keys keep insertion order, values are JSON primitives or
//! nested objects, and the `__type` key carries the type discriminator.

use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Key holding the type discriminator of an encoded object.
pub const TYPE_KEY: &str = "__type";

/// Ordered key/value structure of the legacy encoding.
///
/// # Example
///
/// ```
/// use ews_protocol::legacy::LegacyObject;
///
/// let mut object = LegacyObject::new();
/// object.add("Interval", 2);
/// object.add("DayOfMonth", 15);
/// assert_eq!(object.keys().collect::<Vec<_>>(), ["Interval", "DayOfMonth"]);
/// assert_eq!(object.text("DayOfMonth").as_deref(), Some("15"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyObject {
    entries: Map<String, Value>,
}

impl LegacyObject {
    /// Creates an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object carrying a type discriminator.
    #[must_use]
    pub fn with_type(type_name: &str) -> Self {
        let mut object = Self::new();
        object.add(TYPE_KEY, type_name);
        object
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Inserts or replaces a value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns `true` when `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the type discriminator, if present.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.entries.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// Renders a primitive value as the text the XML encoding would carry.
    ///
    /// Strings are returned verbatim, numbers and booleans in their JSON
    /// spelling. Nested objects, arrays, and nulls have no scalar text.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Returns a nested object stored under `key`.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Self> {
        match self.entries.get(key)? {
            Value::Object(entries) => Some(Self {
                entries: entries.clone(),
            }),
            _ => None,
        }
    }

    /// Serialises the object as compact JSON text.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.entries.clone()).to_string()
    }

    /// Parses JSON text that must contain a single object.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedDocument`] when the text is not JSON
    /// or its top-level value is not an object.
    pub fn from_json_str(text: &str) -> Result<Self, ProtocolError> {
        match serde_json::from_str(text).map_err(ProtocolError::parse_failed)? {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(ProtocolError::malformed(format!(
                "expected a JSON object, found {other}"
            ))),
        }
    }
}

impl From<LegacyObject> for Value {
    fn from(object: LegacyObject) -> Self {
        Self::Object(object.entries)
    }
}

#[cfg(test)]
mod tests;
