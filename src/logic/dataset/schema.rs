//! Reference schema normalization
//!
//! - `CODE_GENDER` must exist (the file is not a credit application table otherwise)
//! - three binary columns are encoded to {0,1} into `APP_*` columns
//! - a fixed set of raw columns moves into the `APP_` namespace so they cannot
//!   collide with engineered feature names downstream

use std::str::FromStr;

use super::frame::Dataset;
use super::DatasetError;
use crate::constants::APP_PREFIX;
use crate::logic::features::FeatureValue;

/// Column whose absence means the payload is not the expected table
pub const REQUIRED_COLUMN: &str = "CODE_GENDER";

/// Application-namespace column names used by the form and the comparisons
pub mod columns {
    pub const GENDER: &str = "APP_CODE_GENDER";
    pub const OWN_CAR: &str = "APP_FLAG_OWN_CAR";
    pub const OWN_REALTY: &str = "APP_FLAG_OWN_REALTY";
    pub const INCOME_TOTAL: &str = "APP_AMT_INCOME_TOTAL";
    pub const CREDIT: &str = "APP_AMT_CREDIT";
    pub const EXT_SOURCE_2: &str = "APP_EXT_SOURCE_2";
    pub const EXT_SOURCE_3: &str = "APP_EXT_SOURCE_3";
    pub const EDUCATION_TYPE: &str = "APP_NAME_EDUCATION_TYPE";
    pub const INCOME_TYPE: &str = "APP_NAME_INCOME_TYPE";
    pub const FAMILY_STATUS: &str = "APP_NAME_FAMILY_STATUS";
    pub const HOUSING_TYPE: &str = "APP_HOUSETYPE_MODE";

    /// Numeric columns offered in the univariate/bivariate comparisons
    pub const NUMERIC: [&str; 4] = [INCOME_TOTAL, CREDIT, EXT_SOURCE_2, EXT_SOURCE_3];
}

/// Raw columns moved to `APP_<name>`
pub const RENAMED_COLUMNS: &[&str] = &[
    "AMT_INCOME_TOTAL",
    "AMT_CREDIT",
    "EXT_SOURCE_2",
    "EXT_SOURCE_3",
    "NAME_EDUCATION_TYPE",
    "NAME_INCOME_TYPE",
    "NAME_FAMILY_STATUS",
    "HOUSETYPE_MODE",
];

// ============================================================================
// BINARY MAPPINGS
// ============================================================================

/// Explicit two-value mapping of a raw categorical column
#[derive(Debug, Clone, Copy)]
pub struct BinaryMapping {
    pub source: &'static str,
    pub target: &'static str,
    pub zero: &'static str,
    pub one: &'static str,
}

pub const BINARY_MAPPINGS: &[BinaryMapping] = &[
    BinaryMapping { source: "CODE_GENDER", target: columns::GENDER, zero: "F", one: "M" },
    BinaryMapping { source: "FLAG_OWN_CAR", target: columns::OWN_CAR, zero: "N", one: "Y" },
    BinaryMapping { source: "FLAG_OWN_REALTY", target: columns::OWN_REALTY, zero: "N", one: "Y" },
];

impl BinaryMapping {
    /// `Some(code)` for a mapped value, `None` otherwise
    pub fn encode(&self, raw: &FeatureValue) -> Option<i64> {
        match raw.as_str() {
            Some(v) if v == self.zero => Some(0),
            Some(v) if v == self.one => Some(1),
            _ => None,
        }
    }
}

/// What to do with a present value outside a binary mapping (e.g. `XNA`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
    /// Store a missing value, count it and log a warning
    #[default]
    Missing,
    /// Fail the load
    Reject,
}

impl FromStr for UnmappedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "missing" => Ok(UnmappedPolicy::Missing),
            "reject" => Ok(UnmappedPolicy::Reject),
            other => Err(format!("unknown unmapped-value policy '{}'", other)),
        }
    }
}

/// What the schema pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// (target column, number of unmapped values)
    pub unmapped: Vec<(String, usize)>,
    pub renamed: Vec<String>,
}

// ============================================================================
// APPLY
// ============================================================================

/// Validate and normalize the raw reference table in place
pub fn apply(dataset: &mut Dataset, policy: UnmappedPolicy) -> Result<SchemaReport, DatasetError> {
    if !dataset.has_column(REQUIRED_COLUMN) {
        return Err(DatasetError::Schema {
            missing: REQUIRED_COLUMN.to_string(),
            columns: dataset.columns().to_vec(),
        });
    }

    let mut report = SchemaReport::default();

    for mapping in BINARY_MAPPINGS {
        let Some(raw) = dataset.column(mapping.source) else {
            log::debug!("Binary column {} absent, {} not derived", mapping.source, mapping.target);
            continue;
        };

        let mut unmapped = 0usize;
        let mut encoded = Vec::with_capacity(raw.len());
        for (row, value) in raw.into_iter().enumerate() {
            if value.is_missing() {
                encoded.push(FeatureValue::missing());
                continue;
            }
            match mapping.encode(value) {
                Some(code) => encoded.push(FeatureValue::Int(code)),
                None if policy == UnmappedPolicy::Reject => {
                    return Err(DatasetError::UnmappedValue {
                        column: mapping.source.to_string(),
                        value: value.to_string(),
                        row,
                    });
                }
                None => {
                    unmapped += 1;
                    encoded.push(FeatureValue::missing());
                }
            }
        }

        if unmapped > 0 {
            log::warn!(
                "{}: {} value(s) outside {{{}, {}}} stored as missing",
                mapping.source,
                unmapped,
                mapping.zero,
                mapping.one
            );
            report.unmapped.push((mapping.target.to_string(), unmapped));
        }
        dataset.put_column(mapping.target, encoded);
    }

    for raw in RENAMED_COLUMNS {
        let target = format!("{}{}", APP_PREFIX, raw);
        if dataset.rename_column(raw, &target) {
            report.renamed.push(target);
        }
    }

    Ok(report)
}
