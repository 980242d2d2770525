//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To point the dashboard at another dataset or scoring API, set the
//! environment variables below (or edit the defaults here).

/// Default reference dataset location (CSV over HTTP)
pub const DEFAULT_REFERENCE_DATA_URL: &str = "https://nrdnsniperbot.site/application_train.csv";

/// Default scoring endpoint
pub const DEFAULT_SCORING_API_URL: &str = "https://credit-scoring-api-s00s.onrender.com/predict";

/// Default model artifact path (relative to the working directory)
pub const DEFAULT_MODEL_PATH: &str = "best_model.json";

/// Default scoring request timeout (seconds)
pub const DEFAULT_SCORING_TIMEOUT: u64 = 30;

/// Default dataset download timeout (seconds)
pub const DEFAULT_DATASET_TIMEOUT: u64 = 120;

/// Fraction of the reference dataset kept in memory
pub const REFERENCE_SAMPLE_FRACTION: f64 = 0.25;

/// Seed of the reference subsample
pub const REFERENCE_SAMPLE_SEED: u64 = 42;

/// Rows used for the global explanation
pub const GLOBAL_SAMPLE_SIZE: usize = 200;

/// Seed of the global explanation sample
pub const GLOBAL_SAMPLE_SEED: u64 = 42;

/// Features shown in the global importance ranking
pub const GLOBAL_MAX_DISPLAY: usize = 10;

/// Probability above which the gauge turns red
pub const RISK_THRESHOLD: f64 = 0.345;

/// Histogram resolution for the univariate comparison
pub const HISTOGRAM_BINS: usize = 50;

/// Prefix of application-owned columns
pub const APP_PREFIX: &str = "APP_";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Credit Scoring Dashboard";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get reference dataset URL from environment or use default
pub fn get_reference_data_url() -> String {
    std::env::var("REFERENCE_DATA_URL")
        .unwrap_or_else(|_| DEFAULT_REFERENCE_DATA_URL.to_string())
}

/// Get scoring endpoint from environment or use default
pub fn get_scoring_api_url() -> String {
    std::env::var("SCORING_API_URL")
        .unwrap_or_else(|_| DEFAULT_SCORING_API_URL.to_string())
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Expected SHA-256 of the model artifact, if pinned
pub fn get_model_checksum() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Get scoring timeout from environment or use default
pub fn get_scoring_timeout() -> u64 {
    std::env::var("SCORING_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&secs: &u64| secs > 0)
        .unwrap_or(DEFAULT_SCORING_TIMEOUT)
}

/// Get dataset download timeout from environment or use default
pub fn get_dataset_timeout() -> u64 {
    std::env::var("DATASET_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&secs: &u64| secs > 0)
        .unwrap_or(DEFAULT_DATASET_TIMEOUT)
}

/// Raw policy name for unmapped binary values ("missing" or "reject")
pub fn get_unmapped_policy() -> String {
    std::env::var("UNMAPPED_CATEGORY_POLICY")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|_| "missing".to_string())
}
