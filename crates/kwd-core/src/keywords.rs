//! Keyword dictionaries.
//!
//! A [`Keywords`] value is a flat string-to-string map with sorted iteration.
//! Keys are case-sensitive and un-namespaced. An empty dictionary is a valid
//! record, distinct from "no record exists".

use std::collections::BTreeMap;

use kwd_db::KeywordMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::DEFAULT_STATISTICS_TYPE;
use crate::errors::{KeywordError, KeywordResult};

// ============================================================================
// Keywords
// ============================================================================

/// Keyword dictionary attached to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords(KeywordMap);

impl Keywords {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from a JSON object.
    ///
    /// String values are taken as-is, numbers and booleans by their textual
    /// form, and nested arrays or objects as compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`KeywordError::InvalidParameter`] if `value` is not an object
    /// or one of its values is `null`.
    pub fn from_json(value: &Value) -> KeywordResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            KeywordError::InvalidParameter(format!(
                "keywords must be a mapping, got {}",
                json_type_name(value)
            ))
        })?;

        let mut map = KeywordMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
                Value::Null => {
                    return Err(KeywordError::InvalidParameter(format!(
                        "keyword `{}` has a null value",
                        key
                    )))
                }
            };
            map.insert(key.clone(), text);
        }
        Ok(Self(map))
    }

    /// Parse a dictionary from JSON text. See [`Keywords::from_json`].
    pub fn from_json_str(text: &str) -> KeywordResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| KeywordError::InvalidParameter(format!("invalid JSON: {}", e)))?;
        Self::from_json(&value)
    }

    /// Render as a JSON object of strings.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    /// Get the value of a keyword.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a keyword, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a keyword, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keyword names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Shallow merge: every key in `other` overwrites the same key here.
    pub fn merge(&mut self, other: &Keywords) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Borrow the raw map.
    pub fn as_map(&self) -> &KeywordMap {
        &self.0
    }

    /// Consume into the raw map.
    pub fn into_map(self) -> KeywordMap {
        self.0
    }
}

impl From<KeywordMap> for Keywords {
    fn from(map: KeywordMap) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Keywords {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Keywords {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregation settings declared by an impact layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Aggregation type, e.g. `sum` or `class_count`.
    pub kind: String,

    /// Aggregation classes, keyed by class name.
    pub classes: BTreeMap<String, Value>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            kind: DEFAULT_STATISTICS_TYPE.to_string(),
            classes: BTreeMap::new(),
        }
    }
}

impl Statistics {
    /// Parse the stored `statistics_classes` text.
    pub(crate) fn parse_classes(keyword: &str, text: &str) -> KeywordResult<BTreeMap<String, Value>> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| KeywordError::InvalidKeywordValue {
                keyword: keyword.to_string(),
                message: format!("expected a JSON object: {}", e),
            })?;

        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(KeywordError::InvalidKeywordValue {
                keyword: keyword.to_string(),
                message: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
        }
    }
}
