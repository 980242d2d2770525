//! Feature Contract - Ordered feature list of the fitted model
//!
//! **The contract is the single source of truth for feature layout**
//!
//! ## Rules:
//! 1. Names come from the model artifact, never from dataset columns
//! 2. Order is significant (it is the model's column order)
//! 3. Names are unique
//!
//! A CRC32 layout hash over the ordered names lets consumers detect records
//! that were shaped against another contract.

use crc32fast::Hasher;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("feature contract is empty")]
    Empty,
    #[error("duplicate feature name in contract: {0}")]
    Duplicate(String),
}

/// Error when a record's layout doesn't match the expected contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Feature layout mismatch: expected {expected_count} features (hash: {expected_hash:08x}), got {actual_count} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub expected_count: usize,
    pub actual_hash: u32,
    pub actual_count: usize,
}

// ============================================================================
// FEATURE CONTRACT
// ============================================================================

/// Immutable, ordered feature-name list. Clones share storage.
#[derive(Debug, Clone)]
pub struct FeatureContract {
    names: Arc<[String]>,
    hash: u32,
}

impl FeatureContract {
    pub fn new<I, S>(names: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ContractError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ContractError::Duplicate(name.clone()));
            }
        }

        let hash = compute_layout_hash(&names);
        Ok(Self {
            names: names.into(),
            hash,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get feature index by name (O(n), contracts are small)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    /// Validate that a record shaped with (`hash`, `count`) matches this contract
    pub fn validate(&self, hash: u32, count: usize) -> Result<(), LayoutMismatchError> {
        if hash != self.hash || count != self.len() {
            return Err(LayoutMismatchError {
                expected_hash: self.hash,
                expected_count: self.len(),
                actual_hash: hash,
                actual_count: count,
            });
        }
        Ok(())
    }
}

impl PartialEq for FeatureContract {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.names == other.names
    }
}

impl Eq for FeatureContract {}

/// Compute CRC32 hash of the ordered names
fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// TESTS
// ============================================================================
