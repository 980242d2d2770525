//! Features Module - Client records and the model feature contract
//!
//! Tách dữ liệu khách hàng (dạng tự do) khỏi layout cố định của model.
//! Every record reaching the scoring API or the explainers goes through
//! `normalize` first.

pub mod contract;
pub mod normalize;
pub mod value;

#[cfg(test)]
mod tests;

// Re-export common types
pub use contract::{ContractError, FeatureContract, LayoutMismatchError};
pub use normalize::{normalize, sanitize, NormalizedRecord, Sanitize};
pub use value::{ClientRecord, FeatureValue};
