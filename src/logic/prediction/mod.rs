//! Prediction Module - Remote scoring
//!
//! Gửi hồ sơ đã chuẩn hóa tới scoring API và đọc kết quả.

pub mod client;


pub use client::{parse_response, Decision, PredictionResult, ScoringClient, ScoringConfig};

/// Scoring errors (per request, recoverable)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// DNS, refused connection, timeout
    #[error("Scoring service unreachable: {0}")]
    Transport(String),

    #[error("Scoring service error: HTTP {status}")]
    Service { status: u16 },

    #[error("Unexpected scoring response: {0}")]
    ResponseFormat(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),
}
