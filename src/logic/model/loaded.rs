//! Loaded Model - artifact validated into a runnable scorer
//!
//! Nạp artifact JSON, kiểm tra checksum, dựng contract và encoder.

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::artifact::{ModelArtifact, ModelSpec, Objective};
use super::forest::Forest;
use super::linear::LinearModel;
use super::{Attributable, Attribution, FeatureModel, ModelError, Scorable};
use crate::logic::explain::{linear_shap, tree_shap};
use crate::logic::features::{FeatureContract, FeatureValue, NormalizedRecord};

// ============================================================================
// CATEGORY ENCODER
// ============================================================================

/// Turns contract-ordered feature values into the model's numeric row.
///
/// Numbers pass through. Text goes through the feature's category table
/// (code = position); unknown categories, text on numeric features and
/// infinite numbers encode as NaN.
#[derive(Debug, Clone, Default)]
pub struct CategoryEncoder {
    tables: Vec<Option<HashMap<String, usize>>>,
}

impl CategoryEncoder {
    fn new(contract: &FeatureContract, artifact: &ModelArtifact) -> Result<Self, ModelError> {
        for name in artifact.categories.keys() {
            if contract.index_of(name).is_none() {
                return Err(ModelError::Invalid(format!(
                    "category table for unknown feature '{}'",
                    name
                )));
            }
        }

        let tables = contract
            .names()
            .iter()
            .map(|name| {
                artifact.categories.get(name).map(|levels| {
                    levels
                        .iter()
                        .enumerate()
                        .map(|(code, level)| (level.clone(), code))
                        .collect::<HashMap<_, _>>()
                })
            })
            .collect();

        Ok(Self { tables })
    }

    pub fn encode_value(&self, index: usize, value: &FeatureValue) -> f64 {
        match value {
            FeatureValue::Int(i) => *i as f64,
            FeatureValue::Float(f) if f.is_finite() => *f,
            FeatureValue::Float(_) => f64::NAN,
            FeatureValue::Text(s) => self
                .tables
                .get(index)
                .and_then(|t| t.as_ref())
                .and_then(|t| t.get(s))
                .map(|code| *code as f64)
                .unwrap_or(f64::NAN),
        }
    }

    pub fn encode(&self, values: &[FeatureValue]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.encode_value(i, v))
            .collect()
    }
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub feature_count: usize,
    pub sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub enum ModelKind {
    Trees(Forest),
    Linear(LinearModel),
}

#[derive(Debug, Clone)]
pub struct LoadedModel {
    metadata: ModelMetadata,
    contract: FeatureContract,
    encoder: CategoryEncoder,
    kind: ModelKind,
    objective: Objective,
}

impl LoadedModel {
    /// Validate a decoded artifact
    pub fn from_artifact(
        artifact: &ModelArtifact,
        model_path: &str,
        sha256: String,
    ) -> Result<Self, ModelError> {
        let contract = FeatureContract::new(artifact.feature_names.iter().cloned())
            .map_err(|e| ModelError::Invalid(e.to_string()))?;
        let encoder = CategoryEncoder::new(&contract, artifact)?;
        let n = contract.len();

        let (kind, objective) = match &artifact.model {
            ModelSpec::TreeEnsemble { objective, base_score, trees } => {
                let forest = Forest::from_spec(*base_score, trees, n).map_err(ModelError::Invalid)?;
                (ModelKind::Trees(forest), *objective)
            }
            ModelSpec::Linear { objective, weights, bias, feature_means } => {
                let linear = LinearModel::new(weights.clone(), *bias, feature_means.clone(), n)
                    .map_err(ModelError::Invalid)?;
                (ModelKind::Linear(linear), *objective)
            }
        };

        let metadata = ModelMetadata {
            model_path: model_path.to_string(),
            model_type: artifact.model.kind().to_string(),
            feature_count: n,
            sha256,
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self { metadata, contract, encoder, kind, objective })
    }

    /// Read, verify and decode an artifact file
    pub fn load_from_path(path: &Path, expected_sha256: Option<&str>) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;

        let sha256 = hex::encode(Sha256::digest(&bytes));
        if let Some(expected) = expected_sha256 {
            if !expected.eq_ignore_ascii_case(&sha256) {
                return Err(ModelError::Load(format!(
                    "checksum mismatch for {}: expected {}, got {}",
                    path.display(),
                    expected,
                    sha256
                )));
            }
        }

        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;

        // A structurally invalid artifact is a load failure too
        let model = Self::from_artifact(&artifact, &path.display().to_string(), sha256)
            .map_err(|e| match e {
                ModelError::Invalid(msg) => ModelError::Load(format!("{}: {}", path.display(), msg)),
                other => other,
            })?;

        log::info!(
            "Model loaded: {} ({}, {} features, sha256 {})",
            model.metadata.model_path,
            model.metadata.model_type,
            model.metadata.feature_count,
            &model.metadata.sha256[..12]
        );
        Ok(model)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Numeric row for a record shaped against this model's contract
    pub fn encode(&self, record: &NormalizedRecord) -> Result<Vec<f64>, ModelError> {
        record.validate(&self.contract)?;
        Ok(self.encoder.encode(record.values()))
    }

    fn raw(&self, row: &[f64]) -> f64 {
        match &self.kind {
            ModelKind::Trees(forest) => forest.predict(row),
            ModelKind::Linear(linear) => linear.predict(row),
        }
    }

    /// Expected raw output (attribution baseline)
    pub fn expected_value(&self) -> f64 {
        match &self.kind {
            ModelKind::Trees(forest) => forest.expected_value(),
            ModelKind::Linear(linear) => linear.expected_value(),
        }
    }

    /// Probability of default (objective transform of the raw output)
    pub fn probability(&self, record: &NormalizedRecord) -> Result<f64, ModelError> {
        Ok(self.objective.transform(self.score(record)?))
    }
}

impl FeatureModel for LoadedModel {
    fn contract(&self) -> &FeatureContract {
        &self.contract
    }
}

/// Scores are raw outputs (log-odds for the binary objective)
impl Scorable for LoadedModel {
    fn score(&self, record: &NormalizedRecord) -> Result<f64, ModelError> {
        let row = self.encode(record)?;
        Ok(self.raw(&row))
    }
}

impl Attributable for LoadedModel {
    fn attribute(&self, record: &NormalizedRecord) -> Result<Attribution, ModelError> {
        let row = self.encode(record)?;
        Ok(match &self.kind {
            ModelKind::Trees(forest) => tree_shap(forest, &row),
            ModelKind::Linear(linear) => linear_shap(linear, &row),
        })
    }
}
