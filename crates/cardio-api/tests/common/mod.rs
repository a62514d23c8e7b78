//! Shared fixtures: a wired-up router over in-memory stores and a stub
//! artifact expressed as wire-format JSON.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use cardio_api::{router, AppState};
use cardio_core::CardioConfig;
use cardio_model::{Explainer, ModelGateway};
use cardio_vitals::ingest::spawn_persistence_worker;
use cardio_vitals::{HistoryStore, LatestCache, LiveFeed, VitalsIngestor};

/// Stub pipeline in the serialized wire format: passthrough numerics,
/// one-hot categoricals, two stumps (systolic >= 130, cholesterol = 3).
pub fn artifact_json(version: &str) -> Value {
    json!({
        "version": version,
        "steps": [
            {
                "name": "pre",
                "kind": "column_transformer",
                "transformers": [
                    {
                        "name": "num",
                        "spec": "passthrough",
                        "columns": ["age", "height", "weight", "ap_hi", "ap_lo",
                                    "age_years", "bmi", "bp_diff"]
                    },
                    {
                        "name": "cat",
                        "spec": {"one_hot": {"categories": [
                            [1.0, 2.0],
                            [1.0, 2.0, 3.0],
                            [1.0, 2.0, 3.0],
                            [0.0, 1.0],
                            [0.0, 1.0],
                            [0.0, 1.0],
                            [0.0, 1.0]
                        ]}},
                        "columns": ["gender", "cholesterol", "gluc", "smoke",
                                    "alco", "active", "gender_bin"]
                    }
                ]
            },
            {
                "name": "clf",
                "kind": "classifier",
                "base_score": -0.3,
                "probability": true,
                "trees": [
                    {"nodes": [
                        {"type": "split", "feature": 3, "threshold": 130.0,
                         "left": 1, "right": 2, "default_left": true, "cover": 100.0},
                        {"type": "leaf", "value": -0.4, "cover": 60.0},
                        {"type": "leaf", "value": 0.7, "cover": 40.0}
                    ]},
                    {"nodes": [
                        {"type": "split", "feature": 12, "threshold": 0.5,
                         "left": 1, "right": 2, "default_left": true, "cover": 100.0},
                        {"type": "leaf", "value": -0.1, "cover": 70.0},
                        {"type": "leaf", "value": 0.5, "cover": 30.0}
                    ]}
                ]
            }
        ]
    })
}

pub fn artifact_bytes(version: &str) -> Vec<u8> {
    serde_json::to_vec(&artifact_json(version)).expect("fixture serializes")
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<ModelGateway>,
    pub history: Arc<HistoryStore>,
    pub cache: Arc<LatestCache>,
    _artifact_dir: tempfile::TempDir,
}

/// Full service wiring over an in-memory history store; no artifact loaded.
pub fn build() -> TestApp {
    let artifact_dir = tempfile::tempdir().expect("tempdir");
    let mut config = CardioConfig::default();
    config.model.artifact_path = artifact_dir
        .path()
        .join("artifact.json")
        .display()
        .to_string();

    let gateway = Arc::new(ModelGateway::new());
    let explainer = Arc::new(Explainer::new(Arc::clone(&gateway)));
    let cache = Arc::new(LatestCache::new());
    let feed = Arc::new(LiveFeed::new(Arc::clone(&cache)));
    let history = Arc::new(HistoryStore::open_in_memory().expect("in-memory store"));

    let (persist_tx, persist_rx) = mpsc::channel(64);
    spawn_persistence_worker(Arc::clone(&history), persist_rx);
    let ingestor = Arc::new(VitalsIngestor::new(
        Arc::clone(&cache),
        feed.publisher(),
        persist_tx,
    ));

    let state = AppState {
        gateway: Arc::clone(&gateway),
        explainer,
        cache: Arc::clone(&cache),
        history: Arc::clone(&history),
        ingestor,
        feed,
        config: Arc::new(config),
    };
    TestApp {
        router: router(state),
        gateway,
        history,
        cache,
        _artifact_dir: artifact_dir,
    }
}

pub fn build_loaded() -> TestApp {
    let app = build();
    app.gateway
        .load_bytes(&artifact_bytes("fixture-1"), "fixture")
        .expect("fixture artifact loads");
    app
}
