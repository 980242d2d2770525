//! Test helpers - in-process HTTP endpoints and model fixtures
//!
//! `spawn_server` runs an axum router on a current-thread tokio runtime in a
//! background thread and returns its base URL. The listener is bound before
//! the thread starts, so requests can be sent immediately.

use axum::Router;
use serde_json::json;

use crate::logic::model::{LoadedModel, ModelArtifact};

pub(crate) fn spawn_server(router: Router) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    listener.set_nonblocking(true).expect("non-blocking listener");
    let addr = listener.local_addr().expect("listener address");

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");

        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let _ = axum::serve(listener, router).await;
        });
    });

    format!("http://{}", addr)
}

// ============================================================================
// MODEL FIXTURES
// ============================================================================

/// Features: A_NUM (numeric), B_CAT (categorical x/y/z), C_NULL (never split on)
pub(crate) const FIXTURE_FEATURES: [&str; 3] = ["A_NUM", "B_CAT", "C_NULL"];

/// Three trees; the third splits twice on A_NUM along one path
pub(crate) fn tree_artifact_json() -> serde_json::Value {
    json!({
        "feature_names": FIXTURE_FEATURES,
        "categories": { "B_CAT": ["x", "y", "z"] },
        "model": {
            "type": "tree_ensemble",
            "objective": "binary",
            "base_score": -1.0,
            "trees": [
                { "nodes": [
                    { "kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 4, "cover": 100.0 },
                    { "kind": "split", "feature": 1, "threshold": 0.5, "left": 2, "right": 3, "cover": 60.0 },
                    { "kind": "leaf", "value": -0.4, "cover": 30.0 },
                    { "kind": "leaf", "value": 0.2, "cover": 30.0 },
                    { "kind": "leaf", "value": 0.7, "cover": 40.0 }
                ]},
                { "nodes": [
                    { "kind": "split", "feature": 1, "threshold": 1.5, "default_left": false, "left": 1, "right": 2, "cover": 100.0 },
                    { "kind": "leaf", "value": 0.1, "cover": 70.0 },
                    { "kind": "leaf", "value": -0.3, "cover": 30.0 }
                ]},
                { "nodes": [
                    { "kind": "split", "feature": 0, "threshold": 0.2, "left": 1, "right": 4, "cover": 100.0 },
                    { "kind": "split", "feature": 0, "threshold": 0.1, "left": 2, "right": 3, "cover": 50.0 },
                    { "kind": "leaf", "value": 0.05, "cover": 20.0 },
                    { "kind": "leaf", "value": -0.15, "cover": 30.0 },
                    { "kind": "leaf", "value": 0.25, "cover": 50.0 }
                ]}
            ]
        }
    })
}

pub(crate) fn linear_artifact_json() -> serde_json::Value {
    json!({
        "feature_names": FIXTURE_FEATURES,
        "categories": { "B_CAT": ["x", "y", "z"] },
        "model": {
            "type": "linear",
            "weights": [0.5, -0.25, 0.0],
            "bias": 0.1,
            "feature_means": [1.0, 2.0, 3.0]
        }
    })
}

pub(crate) fn model_from_json(value: serde_json::Value) -> LoadedModel {
    let artifact: ModelArtifact = serde_json::from_value(value).expect("fixture artifact");
    LoadedModel::from_artifact(&artifact, "fixture.json", String::new()).expect("fixture model")
}

pub(crate) fn tree_model() -> LoadedModel {
    model_from_json(tree_artifact_json())
}

pub(crate) fn linear_model() -> LoadedModel {
    model_from_json(linear_artifact_json())
}
