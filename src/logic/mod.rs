//! Logic Module - Data, model, scoring and explanations
//!
//! Chứa các thành phần xử lý: Dataset, Features, Model, Prediction, Explain.
//!
//! ## Layout
//! - `dataset/` - Reference population (download, schema, sampling, stats)
//! - `features/` - Client records, feature contract, normalization
//! - `model/` - Model artifact, contract resolver, capability traits
//! - `prediction/` - Remote scoring client
//! - `explain/` - SHAP attributions (local & global)

pub mod config;
pub mod dataset;
pub mod explain;
pub mod features;
pub mod model;
pub mod prediction;

#[cfg(test)]
pub(crate) mod testing;
