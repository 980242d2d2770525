//! Model Module - Fitted scoring model and its feature contract
//!
//! Tách model khỏi explanation: explainers chỉ thấy các capability trait.
//!
//! The artifact is read once per process; its `feature_names` are the
//! feature contract every record is normalized against.

pub mod artifact;
pub mod forest;
pub mod linear;
pub mod loaded;


use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants;
use crate::logic::features::{FeatureContract, LayoutMismatchError, NormalizedRecord};

pub use artifact::{ModelArtifact, ModelSpec, Objective};
pub use loaded::{CategoryEncoder, LoadedModel, ModelKind, ModelMetadata};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Missing file, undecodable artifact, checksum mismatch
    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    #[error(transparent)]
    ContractMismatch(#[from] LayoutMismatchError),
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Anything fitted against a feature contract
pub trait FeatureModel {
    fn contract(&self) -> &FeatureContract;
}

/// Produces a raw output for a normalized record
pub trait Scorable: FeatureModel {
    fn score(&self, record: &NormalizedRecord) -> Result<f64, ModelError>;
}

/// Produces additive per-feature attributions
pub trait Attributable: FeatureModel {
    fn attribute(&self, record: &NormalizedRecord) -> Result<Attribution, ModelError>;

    fn attribute_batch(&self, records: &[NormalizedRecord]) -> Result<Vec<Attribution>, ModelError> {
        records.iter().map(|r| self.attribute(r)).collect()
    }
}

/// Raw attribution in contract order: `base_value + Σ values ≈ output`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub base_value: f64,
    pub output: f64,
    pub values: Vec<f64>,
}

// ============================================================================
// CONFIG & GLOBAL STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Expected SHA-256 (hex) of the artifact file
    pub checksum: Option<String>,
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), checksum: None }
    }

    pub fn from_env() -> Self {
        Self {
            path: PathBuf::from(constants::get_model_path()),
            checksum: constants::get_model_checksum(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

static MODEL: OnceCell<LoadedModel> = OnceCell::new();

/// Load (or return the cached) model using env configuration
pub fn load_model() -> Result<&'static LoadedModel, ModelError> {
    if let Some(model) = MODEL.get() {
        return Ok(model);
    }
    load_model_with(&ModelConfig::from_env())
}

/// Load (or return the cached) model. `config` is ignored once loaded.
pub fn load_model_with(config: &ModelConfig) -> Result<&'static LoadedModel, ModelError> {
    MODEL.get_or_try_init(|| LoadedModel::load_from_path(&config.path, config.checksum.as_deref()))
}

/// The loaded model's feature contract
pub fn load_contract() -> Result<&'static FeatureContract, ModelError> {
    load_model().map(|m| m.contract())
}
