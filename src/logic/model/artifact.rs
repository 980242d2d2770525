//! Serialized model artifact (JSON)
//!
//! ```json
//! {
//!   "feature_names": ["APP_CODE_GENDER", "APP_EXT_SOURCE_2", ...],
//!   "categories": { "APP_NAME_INCOME_TYPE": ["Working", "Pensioner", ...] },
//!   "model": { "type": "tree_ensemble", "objective": "binary", "base_score": 0.0,
//!              "trees": [ { "nodes": [ { "kind": "split", ... }, { "kind": "leaf", ... } ] } ] }
//! }
//! ```
//!
//! Node 0 is the root of each tree; children always have a larger index than
//! their parent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Ordered feature names the model was fitted on
    pub feature_names: Vec<String>,

    /// Category tables: code = position in the list
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    pub model: ModelSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Raw output is log-odds; probability = sigmoid(raw)
    #[default]
    Binary,
    /// Raw output is the prediction
    Regression,
}

impl Objective {
    pub fn transform(&self, raw: f64) -> f64 {
        match self {
            Objective::Binary => 1.0 / (1.0 + (-raw).exp()),
            Objective::Regression => raw,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    TreeEnsemble {
        #[serde(default)]
        objective: Objective,
        #[serde(default)]
        base_score: f64,
        trees: Vec<TreeSpec>,
    },
    Linear {
        #[serde(default)]
        objective: Objective,
        weights: Vec<f64>,
        bias: f64,
        /// Background means, used for missing inputs and as the SHAP baseline
        feature_means: Vec<f64>,
    },
}

impl ModelSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSpec::TreeEnsemble { .. } => "tree_ensemble",
            ModelSpec::Linear { .. } => "linear",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSpec {
    Split {
        feature: usize,
        threshold: f64,
        #[serde(default = "default_left")]
        default_left: bool,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

fn default_left() -> bool {
    true
}
