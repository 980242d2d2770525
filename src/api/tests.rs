use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tokio::sync::{mpsc, Notify};

use super::*;
use crate::logic::dataset::{columns, Dataset};
use crate::logic::features::FeatureValue;
use crate::logic::model::LoadedModel;
use crate::logic::prediction::{ScoringClient, ScoringConfig};
use crate::logic::testing::{model_from_json, spawn_server};

const INCOME_TYPES: [&str; 3] = ["Working", "Pensioner", "Commercial associate"];

fn model() -> LoadedModel {
    model_from_json(json!({
        "feature_names": [
            "APP_CODE_GENDER", "APP_AMT_CREDIT", "APP_EXT_SOURCE_2",
            "APP_EXT_SOURCE_3", "APP_NAME_INCOME_TYPE", "FOO"
        ],
        "categories": { "APP_NAME_INCOME_TYPE": INCOME_TYPES },
        "model": {
            "type": "linear",
            "weights": [0.3, 0.000001, -1.0, -1.5, 0.1, 0.0],
            "bias": -0.5,
            "feature_means": [0.5, 500000.0, 0.5, 0.5, 1.0, 0.0]
        }
    }))
}

fn dataset() -> Dataset {
    let names = [
        "SK_ID_CURR",
        columns::GENDER,
        columns::INCOME_TOTAL,
        columns::CREDIT,
        columns::EXT_SOURCE_2,
        columns::EXT_SOURCE_3,
        columns::INCOME_TYPE,
    ];
    let rows = (0..50)
        .map(|i| {
            let ext3 = if i % 7 == 0 {
                FeatureValue::missing()
            } else {
                FeatureValue::Float((i % 10) as f64 / 10.0)
            };
            vec![
                FeatureValue::Int(100000 + i),
                FeatureValue::Int(i % 2),
                FeatureValue::Float(100000.0 + 1000.0 * i as f64),
                FeatureValue::Float(250000.0 + 5000.0 * i as f64),
                FeatureValue::Float(((i * 3) % 11) as f64 / 10.0),
                ext3,
                FeatureValue::Text(INCOME_TYPES[i as usize % 3].to_string()),
            ]
        })
        .collect();
    Dataset::from_rows(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
}

fn offline_client() -> ScoringClient {
    ScoringClient::new(ScoringConfig::new("http://127.0.0.1:9/predict"))
}

fn client_with(status: StatusCode, body: &'static str) -> ScoringClient {
    let url = spawn_server(Router::new().route("/predict", post(move || async move { (status, body) })));
    let mut config = ScoringConfig::new(format!("{}/predict", url));
    config.timeout_seconds = 5;
    ScoringClient::new(config)
}

// ============================================================================
// SELECTION
// ============================================================================

#[test]
fn test_initial_session_uses_form_defaults() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());
    let session = dashboard.session();
    assert_eq!(session.form, ApplicantForm::default());
    assert_eq!(session.client_id, None);
    assert_eq!(session.last_score, None);
}

#[test]
fn test_select_existing_prefills_form() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let form = dashboard.select_client(ClientSelection::Existing { id: 3 }).unwrap();
    assert_eq!(form.gender, 1);
    assert_eq!(form.credit_amount, 265_000);
    assert_eq!(form.income_type, IncomeType::Working);
    assert_eq!(dashboard.session().client_id, Some(3));
}

#[test]
fn test_select_random_is_a_reference_row() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let mut rng = StdRng::seed_from_u64(7);
    let form = dashboard
        .select_client_with_rng(ClientSelection::Random, &mut rng)
        .unwrap();
    let id = dashboard.session().client_id.unwrap();
    assert_eq!(form, ApplicantForm::prefill_from(&data.row(id).unwrap()));
}

#[test]
fn test_failed_selection_leaves_session_unchanged() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());
    dashboard.select_client(ClientSelection::Existing { id: 4 }).unwrap();
    let before = dashboard.session();

    assert!(dashboard.select_client(ClientSelection::Existing { id: 999 }).is_err());
    let invalid = ApplicantForm { owns_car: 3, ..Default::default() };
    assert!(dashboard.select_client(ClientSelection::Manual { form: invalid }).is_err());

    assert_eq!(dashboard.session(), before);
}

// ============================================================================
// PREDICTION
// ============================================================================

#[test]
fn test_predict_accepted_view() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(
        &data,
        &model,
        client_with(StatusCode::OK, r#"{"prediction":0,"probability":0.12}"#),
    );

    let view = dashboard.predict().unwrap();
    assert_eq!(view.prediction, 0);
    assert_eq!(view.probability, 0.12);
    assert_eq!(view.decision_label, "Accepté");
    assert_eq!(view.risk_threshold, 0.345);
    assert!(!view.above_threshold);
    assert_eq!(dashboard.session().last_score, Some(view));
}

#[test]
fn test_service_error_keeps_session() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, client_with(StatusCode::INTERNAL_SERVER_ERROR, "down"));
    dashboard.select_client(ClientSelection::Existing { id: 10 }).unwrap();
    let before = dashboard.session();

    let message = dashboard.predict().unwrap_err();
    assert!(message.contains("500"), "{}", message);
    assert_eq!(dashboard.session(), before);
}

#[test]
fn test_score_not_attached_to_newly_selected_client() {
    let (data, model) = (dataset(), model());

    // The endpoint reports the request, then waits until released
    let (received_tx, mut received_rx) = mpsc::unbounded_channel::<()>();
    let release = Arc::new(Notify::new());
    let gate = release.clone();
    let url = spawn_server(Router::new().route(
        "/predict",
        post(move || {
            let received_tx = received_tx.clone();
            let gate = gate.clone();
            async move {
                let _ = received_tx.send(());
                gate.notified().await;
                r#"{"prediction":1,"probability":0.8}"#
            }
        }),
    ));
    let mut config = ScoringConfig::new(format!("{}/predict", url));
    config.timeout_seconds = 5;

    let dashboard = Dashboard::new(&data, &model, ScoringClient::new(config));
    dashboard.select_client(ClientSelection::Existing { id: 1 }).unwrap();

    std::thread::scope(|s| {
        let pending = s.spawn(|| dashboard.predict());
        received_rx.blocking_recv().unwrap();
        dashboard.select_client(ClientSelection::Existing { id: 2 }).unwrap();
        release.notify_one();

        let view = pending.join().unwrap().unwrap();
        assert_eq!(view.prediction, 1);
    });

    let session = dashboard.session();
    assert_eq!(session.client_id, Some(2));
    assert_eq!(session.last_score, None);
}

// ============================================================================
// EXPLANATION & COMPARISON
// ============================================================================

#[test]
fn test_explain_local_current_applicant() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let set = dashboard.explain_local().unwrap();
    assert!(set.verify(1e-6));
    assert_eq!(set.contributions.len(), 6);
    assert_eq!(set.get("FOO"), Some(0.0));
    // Default form: EXT_SOURCE_3 = 0.5 = mean
    assert_eq!(set.get(columns::EXT_SOURCE_3), Some(0.0));
}

#[test]
fn test_explain_global_clamped_and_ranked() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let view = dashboard.explain_global().unwrap();
    assert_eq!(view.n_samples, 50);
    assert_eq!(view.top.len(), 6);
    assert_eq!(view.top.last().map(|c| c.name.as_str()), Some("FOO"));
    assert_eq!(dashboard.explain_global().unwrap(), view);
}

#[test]
fn test_compare_feature() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let view = dashboard.compare_feature(columns::CREDIT).unwrap();
    assert_eq!(view.histogram.counts.len(), 50);
    assert_eq!(view.histogram.total(), 50);
    assert_eq!(view.summary.count, 50);
    assert_eq!(view.client_value, Some(200_000.0));
    assert_eq!(view.client_percentile, Some(0.0));

    // Missing cells are left out of the distribution
    let view = dashboard.compare_feature(columns::EXT_SOURCE_3).unwrap();
    assert_eq!(view.summary.count, 42);

    assert!(dashboard.compare_feature(columns::GENDER).is_err());
}

#[test]
fn test_compare_features_scatter() {
    let (data, model) = (dataset(), model());
    let dashboard = Dashboard::new(&data, &model, offline_client());

    let view = dashboard
        .compare_features(columns::EXT_SOURCE_2, columns::EXT_SOURCE_3)
        .unwrap();
    assert_eq!(view.points.len(), 42);
    assert_eq!(view.client, Some((0.5, 0.5)));
    assert!(dashboard.compare_features("SK_ID_CURR", columns::CREDIT).is_err());
}
