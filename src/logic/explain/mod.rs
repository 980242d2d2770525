//! Explain Module - Additive feature attributions (SHAP)
//!
//! Giải thích điểm số: local cho một hồ sơ, global trên một mẫu cố định.
//!
//! Explanations only accept `NormalizedRecord`s shaped against the model's
//! own contract; values are in the model's raw output space (log-odds for a
//! binary tree ensemble).

pub mod linear;
pub mod permutation;
pub mod tree_shap;
pub mod types;


use ndarray::{Array2, Axis};

use crate::logic::dataset::Dataset;
use crate::logic::features::{normalize, ClientRecord, FeatureContract, LayoutMismatchError, NormalizedRecord};
use crate::logic::model::{Attributable, Attribution, ModelError};

pub use linear::linear_shap;
pub use permutation::{SampledExplainer, ShapleySampler};
pub use tree_shap::tree_shap;
pub use types::{AttributionSet, FeatureContribution, GlobalAttribution};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExplainError {
    #[error(transparent)]
    ContractMismatch(#[from] LayoutMismatchError),

    #[error("No records to explain")]
    EmptySample,

    #[error("Model error during explanation: {0}")]
    Model(#[from] ModelError),
}

// ============================================================================
// LOCAL
// ============================================================================

/// Attribute one normalized record
pub fn explain_local<A: Attributable + ?Sized>(
    model: &A,
    record: &NormalizedRecord,
) -> Result<AttributionSet, ExplainError> {
    record.validate(model.contract())?;
    let attribution = model.attribute(record)?;
    Ok(named(model.contract(), attribution))
}

/// Normalize then attribute a raw client record
pub fn explain_record<A: Attributable + ?Sized>(
    model: &A,
    record: &ClientRecord,
) -> Result<AttributionSet, ExplainError> {
    explain_local(model, &normalize(record, model.contract()))
}

fn named(contract: &FeatureContract, attribution: Attribution) -> AttributionSet {
    let contributions = contract
        .names()
        .iter()
        .zip(attribution.values)
        .map(|(name, value)| FeatureContribution { name: name.clone(), value })
        .collect();

    AttributionSet {
        base_value: attribution.base_value,
        output: attribution.output,
        contributions,
    }
}

// ============================================================================
// GLOBAL
// ============================================================================

/// Fixed-seed sample of the reference rows, normalized against `contract`.
/// Draws independently of the cached sample and never mutates it.
pub fn global_sample(
    dataset: &Dataset,
    contract: &FeatureContract,
    size: usize,
    seed: u64,
) -> Vec<NormalizedRecord> {
    dataset
        .sample_rows(size, seed)
        .iter()
        .map(|row| normalize(row, contract))
        .collect()
}

/// Mean |attribution| per feature over `records`
pub fn explain_global<A: Attributable + ?Sized>(
    model: &A,
    records: &[NormalizedRecord],
) -> Result<GlobalAttribution, ExplainError> {
    if records.is_empty() {
        return Err(ExplainError::EmptySample);
    }
    let contract = model.contract();
    for record in records {
        record.validate(contract)?;
    }

    let attributions = model.attribute_batch(records)?;

    let mut matrix = Array2::<f64>::zeros((records.len(), contract.len()));
    for (i, attribution) in attributions.iter().enumerate() {
        for (j, value) in attribution.values.iter().enumerate() {
            matrix[[i, j]] = value.abs();
        }
    }

    let means = matrix.mean_axis(Axis(0)).ok_or(ExplainError::EmptySample)?;
    let base_value = attributions.iter().map(|a| a.base_value).sum::<f64>() / attributions.len() as f64;

    let importances = contract
        .names()
        .iter()
        .zip(means.iter())
        .map(|(name, value)| FeatureContribution { name: name.clone(), value: *value })
        .collect();

    log::debug!("Global attribution over {} records", records.len());

    Ok(GlobalAttribution {
        n_samples: records.len(),
        base_value,
        importances,
    })
}
