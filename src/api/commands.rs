//! Dashboard Commands - API cho giao diện
//!
//! One session = one operator. Every command either succeeds and returns a
//! view, or returns an error message and leaves the session as it was.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::form::ApplicantForm;
use crate::constants;
use crate::logic::dataset::stats::{percentile_rank, Histogram, Summary};
use crate::logic::dataset::{columns, Dataset};
use crate::logic::explain::{self, AttributionSet, FeatureContribution};
use crate::logic::features::{normalize, FeatureValue, NormalizedRecord};
use crate::logic::model::Attributable;
use crate::logic::prediction::{Decision, ScoringClient};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// How the applicant is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClientSelection {
    Manual { form: ApplicantForm },
    Existing { id: usize },
    Random,
}

/// Score card shown after "Prédire"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreView {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub prediction: i64,
    pub probability: f64,
    pub decision: Decision,
    pub decision_label: String,
    pub risk_threshold: f64,
    pub above_threshold: bool,
}

/// Current applicant and the last successful score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub form: ApplicantForm,
    /// Reference row the form was filled from, if any
    pub client_id: Option<usize>,
    pub last_score: Option<ScoreView>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            form: ApplicantForm::default(),
            client_id: None,
            last_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalView {
    pub n_samples: usize,
    pub base_value: f64,
    pub top: Vec<FeatureContribution>,
}

/// Univariate comparison of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonView {
    pub column: String,
    pub client_value: Option<f64>,
    pub client_percentile: Option<f64>,
    pub histogram: Histogram,
    pub summary: Summary,
}

/// Bivariate comparison: population points plus the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterView {
    pub x: String,
    pub y: String,
    pub points: Vec<(f64, f64)>,
    pub client: Option<(f64, f64)>,
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard<'a, M: Attributable + ?Sized> {
    dataset: &'a Dataset,
    model: &'a M,
    scoring: ScoringClient,
    session: RwLock<SessionState>,
}

impl<'a, M: Attributable + ?Sized> Dashboard<'a, M> {
    pub fn new(dataset: &'a Dataset, model: &'a M, scoring: ScoringClient) -> Self {
        Self {
            dataset,
            model,
            scoring,
            session: RwLock::new(SessionState::default()),
        }
    }

    /// Snapshot of the session
    pub fn session(&self) -> SessionState {
        self.session.read().clone()
    }

    pub fn form(&self) -> ApplicantForm {
        self.session.read().form.clone()
    }

    pub fn select_client(&self, selection: ClientSelection) -> Result<ApplicantForm, String> {
        self.select_client_with_rng(selection, &mut rand::thread_rng())
    }

    pub fn select_client_with_rng<R: Rng + ?Sized>(
        &self,
        selection: ClientSelection,
        rng: &mut R,
    ) -> Result<ApplicantForm, String> {
        let (form, client_id) = match selection {
            ClientSelection::Manual { form } => {
                form.check().map_err(|e| format!("Invalid form: {}", e))?;
                (form, None)
            }
            ClientSelection::Existing { id } => {
                let row = self
                    .dataset
                    .row(id)
                    .ok_or_else(|| format!("Client {} not found ({} clients)", id, self.dataset.len()))?;
                (ApplicantForm::prefill_from(&row), Some(id))
            }
            ClientSelection::Random => {
                let (id, row) = self
                    .dataset
                    .random_row(rng)
                    .ok_or_else(|| "Reference data is empty".to_string())?;
                (ApplicantForm::prefill_from(&row), Some(id))
            }
        };

        log::debug!("Client selected: {:?}", client_id);

        let mut session = self.session.write();
        session.form = form.clone();
        session.client_id = client_id;
        session.last_score = None;
        Ok(form)
    }

    fn normalized(&self, form: &ApplicantForm) -> NormalizedRecord {
        normalize(&form.to_record(), self.model.contract())
    }

    /// Score the current applicant through the remote service.
    /// The score is kept only if the applicant did not change meanwhile.
    pub fn predict(&self) -> Result<ScoreView, String> {
        let (form, client_id) = {
            let session = self.session.read();
            (session.form.clone(), session.client_id)
        };
        let record = self.normalized(&form);
        let request_id = Uuid::new_v4();

        let result = self
            .scoring
            .predict_tagged(request_id, &record)
            .map_err(|e| e.to_string())?;

        let decision = result.decision();
        let view = ScoreView {
            request_id,
            timestamp: Utc::now(),
            prediction: result.prediction,
            probability: result.probability,
            decision,
            decision_label: decision.label().to_string(),
            risk_threshold: constants::RISK_THRESHOLD,
            above_threshold: result.probability > constants::RISK_THRESHOLD,
        };

        log::info!(
            "[{}] Score {:.3} -> {}",
            request_id,
            view.probability,
            view.decision_label
        );

        let mut session = self.session.write();
        if session.form == form && session.client_id == client_id {
            session.last_score = Some(view.clone());
        } else {
            log::warn!("[{}] Applicant changed during scoring, score not kept", request_id);
        }
        Ok(view)
    }

    /// Local attribution of the current applicant
    pub fn explain_local(&self) -> Result<AttributionSet, String> {
        let record = self.normalized(&self.form());
        explain::explain_local(self.model, &record).map_err(|e| e.to_string())
    }

    /// Mean |attribution| over the fixed-seed global sample, top features
    pub fn explain_global(&self) -> Result<GlobalView, String> {
        let sample = explain::global_sample(
            self.dataset,
            self.model.contract(),
            constants::GLOBAL_SAMPLE_SIZE,
            constants::GLOBAL_SAMPLE_SEED,
        );
        let global = explain::explain_global(self.model, &sample).map_err(|e| e.to_string())?;

        Ok(GlobalView {
            n_samples: global.n_samples,
            base_value: global.base_value,
            top: global.top(constants::GLOBAL_MAX_DISPLAY),
        })
    }

    /// Histogram, summary and percentile of the applicant for one column
    pub fn compare_feature(&self, column: &str) -> Result<ComparisonView, String> {
        check_numeric(column)?;

        let values = self.dataset.column_values(column);
        let histogram = Histogram::compute(&values, constants::HISTOGRAM_BINS)
            .ok_or_else(|| format!("No values for {}", column))?;
        let summary = Summary::compute(&values).ok_or_else(|| format!("No values for {}", column))?;

        let client_value = client_value(&self.form(), column);
        let client_percentile = client_value.and_then(|v| percentile_rank(&values, v));

        Ok(ComparisonView {
            column: column.to_string(),
            client_value,
            client_percentile,
            histogram,
            summary,
        })
    }

    /// Scatter of two numeric columns plus the applicant's point
    pub fn compare_features(&self, x: &str, y: &str) -> Result<ScatterView, String> {
        check_numeric(x)?;
        check_numeric(y)?;

        let points = (0..self.dataset.len())
            .filter_map(|i| {
                let vx = self.dataset.value(i, x).and_then(FeatureValue::as_finite)?;
                let vy = self.dataset.value(i, y).and_then(FeatureValue::as_finite)?;
                Some((vx, vy))
            })
            .collect();

        let form = self.form();
        let client = client_value(&form, x).zip(client_value(&form, y));

        Ok(ScatterView {
            x: x.to_string(),
            y: y.to_string(),
            points,
            client,
        })
    }
}

fn check_numeric(column: &str) -> Result<(), String> {
    if columns::NUMERIC.contains(&column) {
        Ok(())
    } else {
        Err(format!(
            "{} is not comparable (choose one of {:?})",
            column,
            columns::NUMERIC
        ))
    }
}

fn client_value(form: &ApplicantForm, column: &str) -> Option<f64> {
    form.to_record().get(column).and_then(FeatureValue::as_finite)
}
