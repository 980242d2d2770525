//! Input Normalizer
//!
//! Projects a `ClientRecord` onto a `FeatureContract`:
//! - contract features present in the record are copied unchanged
//! - contract features absent from the record become `0`
//! - fields outside the contract are dropped (display-only fields are normal)
//!
//! JSON-safety (`sanitize`) is a separate step so it can also be applied to
//! raw display records.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::contract::{FeatureContract, LayoutMismatchError};
use super::value::{ClientRecord, FeatureValue};

// ============================================================================
// NORMALIZED RECORD
// ============================================================================

/// A record in exact contract order.
///
/// Only `normalize` builds these outside the crate, so holding one means the
/// layout invariant (`len == contract.len()`, same order) holds.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    contract: FeatureContract,
    values: Vec<FeatureValue>,
}

impl NormalizedRecord {
    /// Assemble from values already in contract order
    pub(crate) fn from_parts(contract: FeatureContract, values: Vec<FeatureValue>) -> Self {
        debug_assert_eq!(contract.len(), values.len());
        Self { contract, values }
    }

    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn layout_hash(&self) -> u32 {
        self.contract.layout_hash()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.contract.index_of(name).map(|i| &self.values[i])
    }

    /// (name, value) pairs in contract order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.contract
            .names()
            .iter()
            .map(|n| n.as_str())
            .zip(self.values.iter())
    }

    /// Check this record against the contract a consumer expects
    pub fn validate(&self, expected: &FeatureContract) -> Result<(), LayoutMismatchError> {
        expected.validate(self.layout_hash(), self.len())
    }

    pub fn to_record(&self) -> ClientRecord {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

/// Serializes as a JSON object whose key order is the contract order
impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Reshape `record` to exactly match `contract`. Pure and deterministic.
pub fn normalize(record: &ClientRecord, contract: &FeatureContract) -> NormalizedRecord {
    let values: Vec<FeatureValue> = contract
        .names()
        .iter()
        .map(|name| record.get(name).cloned().unwrap_or_else(FeatureValue::zero))
        .collect();

    if log::log_enabled!(log::Level::Trace) {
        let dropped = record
            .names()
            .filter(|n| contract.index_of(n).is_none())
            .count();
        log::trace!(
            "Normalized record: {} contract features, {} extra fields dropped",
            contract.len(),
            dropped
        );
    }

    NormalizedRecord::from_parts(contract.clone(), values)
}

// ============================================================================
// SANITIZATION
// ============================================================================

/// Replace non-finite numbers by `0` so the value survives JSON transport
pub trait Sanitize {
    fn sanitized(&self) -> Self;
}

impl Sanitize for FeatureValue {
    fn sanitized(&self) -> Self {
        if self.is_non_finite() {
            FeatureValue::zero()
        } else {
            self.clone()
        }
    }
}

impl Sanitize for ClientRecord {
    fn sanitized(&self) -> Self {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.sanitized()))
            .collect()
    }
}

impl Sanitize for NormalizedRecord {
    fn sanitized(&self) -> Self {
        let values = self.values.iter().map(Sanitize::sanitized).collect();
        NormalizedRecord::from_parts(self.contract.clone(), values)
    }
}

/// JSON-safety pass: NaN and +/- infinity become `0`, everything else is kept
pub fn sanitize<R: Sanitize>(record: &R) -> R {
    record.sanitized()
}
