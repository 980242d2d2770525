//! Dataset Module - Reference population
//!
//! Downloads the reference CSV once per process, normalizes a few columns and
//! keeps a reproducible 25 % sample for lookups, random draws, comparisons and
//! the global explanation. Read-only after the first successful load.

pub mod frame;
pub mod loader;
pub mod sample;
pub mod schema;
pub mod stats;


use once_cell::sync::OnceCell;

pub use frame::Dataset;
pub use loader::{fetch, parse_csv, DatasetConfig};
pub use schema::{columns, UnmappedPolicy};

/// Reference data load errors (unrecoverable for the session)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("Network error while downloading reference data: {0}")]
    Transport(String),

    #[error("Reference data download failed: HTTP {status}")]
    Fetch { status: u16 },

    #[error("Reference data is not valid CSV: {0}")]
    Parse(String),

    #[error("Reference data has no '{missing}' column (columns: {columns:?})")]
    Schema { missing: String, columns: Vec<String> },

    #[error("Column {column} row {row}: value '{value}' is outside the binary mapping")]
    UnmappedValue { column: String, value: String, row: usize },
}

// Global singleton, initialized at most once
static DATASET: OnceCell<Dataset> = OnceCell::new();

/// Load (or return the cached) reference dataset using env configuration
pub fn load() -> Result<&'static Dataset, DatasetError> {
    if let Some(dataset) = DATASET.get() {
        return Ok(dataset);
    }
    load_with(&DatasetConfig::from_env())
}

/// Load (or return the cached) reference dataset.
/// Once a load succeeded, `config` is ignored: there is no refresh path.
pub fn load_with(config: &DatasetConfig) -> Result<&'static Dataset, DatasetError> {
    DATASET.get_or_try_init(|| fetch(config))
}
