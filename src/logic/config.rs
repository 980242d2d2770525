//! Dashboard configuration, gathered from the environment
//!
//! Defaults live in `constants.rs`; the binary loads `.env` before calling
//! `DashboardConfig::from_env()`.

use super::dataset::DatasetConfig;
use super::model::ModelConfig;
use super::prediction::ScoringConfig;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self {
            dataset: DatasetConfig::from_env(),
            model: ModelConfig::from_env(),
            scoring: ScoringConfig::from_env(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
