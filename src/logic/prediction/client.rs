//! Scoring API Client
//!
//! Blocking HTTP client for the remote credit-scoring service.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::PredictionError;
use crate::constants;
use crate::logic::features::{sanitize, NormalizedRecord};

/// Scoring service configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl ScoringConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_seconds: constants::DEFAULT_SCORING_TIMEOUT,
        }
    }

    pub fn from_env() -> Self {
        Self {
            endpoint: constants::get_scoring_api_url(),
            timeout_seconds: constants::get_scoring_timeout(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

// Request/Response types

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    prediction: i64,
    probability: f64,
}

/// Outcome of one scoring call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: i64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Refused,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Accepted => "Accepté",
            Decision::Refused => "Refusé",
        }
    }
}

impl PredictionResult {
    /// 0 = accepted, anything else = refused
    pub fn decision(&self) -> Decision {
        if self.prediction == 0 {
            Decision::Accepted
        } else {
            Decision::Refused
        }
    }
}

/// Scoring API client
pub struct ScoringClient {
    config: ScoringConfig,
    agent: ureq::Agent,
}

impl ScoringClient {
    pub fn new(config: ScoringConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build();
        Self { config, agent }
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Bound on the whole request (connect + send + read)
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    /// Score one record. Single attempt, no retry.
    pub fn predict(&self, record: &NormalizedRecord) -> Result<PredictionResult, PredictionError> {
        self.predict_tagged(Uuid::new_v4(), record)
    }

    /// Score one record under a caller-chosen request id
    pub fn predict_tagged(
        &self,
        request_id: Uuid,
        record: &NormalizedRecord,
    ) -> Result<PredictionResult, PredictionError> {
        let body = serde_json::to_string(&sanitize(record))
            .map_err(|e| PredictionError::Encode(e.to_string()))?;

        log::debug!(
            "[{}] POST {} ({} features)",
            request_id,
            self.config.endpoint,
            record.len()
        );

        let response = self
            .agent
            .post(&self.config.endpoint)
            .set("Content-Type", "application/json")
            .send_string(&body);

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                log::warn!("[{}] Scoring service returned HTTP {}", request_id, status);
                return Err(PredictionError::Service { status });
            }
            Err(e) => {
                log::warn!("[{}] Scoring request failed: {}", request_id, e);
                return Err(PredictionError::Transport(e.to_string()));
            }
        };

        if response.status() != 200 {
            let status = response.status();
            log::warn!("[{}] Scoring service returned HTTP {}", request_id, status);
            return Err(PredictionError::Service { status });
        }

        let text = response
            .into_string()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        let result = parse_response(&text)?;
        log::debug!(
            "[{}] prediction={} probability={:.4}",
            request_id,
            result.prediction,
            result.probability
        );
        Ok(result)
    }
}

/// Validate a 200 response body
pub fn parse_response(body: &str) -> Result<PredictionResult, PredictionError> {
    let parsed: ScoreResponse = serde_json::from_str(body)
        .map_err(|e| PredictionError::ResponseFormat(e.to_string()))?;

    if !(0.0..=1.0).contains(&parsed.probability) {
        return Err(PredictionError::ResponseFormat(format!(
            "probability {} outside [0, 1]",
            parsed.probability
        )));
    }

    Ok(PredictionResult {
        prediction: parsed.prediction,
        probability: parsed.probability,
    })
}
