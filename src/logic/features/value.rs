//! Feature values and client records
//!
//! A `ClientRecord` is the loosely-typed applicant as it comes from the form,
//! a reference row or a random draw. Keys are not guaranteed to match the
//! model's feature contract; presence is always checked explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// FEATURE VALUE
// ============================================================================

/// Scalar value of one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    /// Placeholder used for features the record does not carry
    pub fn zero() -> Self {
        FeatureValue::Int(0)
    }

    /// Missing value (empty CSV cell, unmapped category)
    pub fn missing() -> Self {
        FeatureValue::Float(f64::NAN)
    }

    /// Parse one CSV cell: integer, then float, then text.
    /// Empty cells are missing.
    pub fn parse_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::missing();
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return FeatureValue::Int(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => FeatureValue::Float(f),
            Err(_) => FeatureValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric view (text has none)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(i) => Some(*i as f64),
            FeatureValue::Float(f) => Some(*f),
            FeatureValue::Text(_) => None,
        }
    }

    /// Finite numeric view
    pub fn as_finite(&self) -> Option<f64> {
        self.as_f64().filter(|v| v.is_finite())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// NaN or +/- infinity
    pub fn is_non_finite(&self) -> bool {
        matches!(self, FeatureValue::Float(f) if !f.is_finite())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Float(f) if f.is_nan())
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(i) => write!(f, "{}", i),
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<i32> for FeatureValue {
    fn from(v: i32) -> Self {
        FeatureValue::Int(v as i64)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

// ============================================================================
// CLIENT RECORD
// ============================================================================

/// One applicant, keyed by feature name.
///
/// Built once (consuming builder) and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl ClientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FeatureValue)> for ClientRecord {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
