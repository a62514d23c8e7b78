//! Prediction, explanation, and model-diagnostics handlers.

use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use cardio_core::constants::{DEFAULT_TOP_K, FEATURE_COLUMNS, VERSION};
use cardio_core::{AttributionResult, CardioError, ClinicalSample};
use cardio_model::features::build_features;
use cardio_model::Prediction;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict_full", post(predict_full))
        .route("/predict_simple", post(predict_simple))
        .route("/explain_full", post(explain_full))
        .route("/feature_names", get(feature_names))
        .route("/feature_labels", get(feature_labels))
        .route("/model_info", get(model_info))
        .route("/debug_pipeline", get(debug_pipeline))
        .route("/ml_health", get(ml_health))
        .route("/versions", get(versions))
        .route("/reload", post(reload))
}

// ── Request bodies ───────────────────────────────────────────────────

/// Strict variant: every clinical field required.
#[derive(Debug, Deserialize)]
struct StrictSample {
    age: f64,
    height: f64,
    weight: f64,
    ap_hi: f64,
    ap_lo: f64,
    cholesterol: f64,
    gluc: f64,
    smoke: f64,
    alco: f64,
    active: f64,
    gender: f64,
}

impl From<StrictSample> for ClinicalSample {
    fn from(s: StrictSample) -> Self {
        ClinicalSample {
            age: Some(s.age),
            height: Some(s.height),
            weight: Some(s.weight),
            ap_hi: Some(s.ap_hi),
            ap_lo: Some(s.ap_lo),
            cholesterol: Some(s.cholesterol),
            gluc: Some(s.gluc),
            smoke: Some(s.smoke),
            alco: Some(s.alco),
            active: Some(s.active),
            gender: Some(s.gender),
        }
    }
}

/// Coarse convenience inputs, mapped onto the full feature set.
#[derive(Debug, Deserialize)]
struct SimpleSample {
    /// Age in years.
    age: Option<f64>,
    /// "male" / "female" (first-letter match).
    gender: Option<String>,
    cholesterol: Option<f64>,
    /// Systolic pressure (ap_hi).
    bp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ExplainRequest {
    #[serde(flatten)]
    sample: ClinicalSample,
    top_k: Option<usize>,
}

// ── Prediction ───────────────────────────────────────────────────────

async fn predict(
    State(state): State<AppState>,
    Json(body): Json<StrictSample>,
) -> Result<Json<Prediction>, ApiError> {
    let sample = ClinicalSample::from(body);
    sample.validate_domains()?;
    let out = state.gateway.predict(&build_features(&sample))?;
    Ok(Json(out))
}

async fn predict_full(
    State(state): State<AppState>,
    Json(sample): Json<ClinicalSample>,
) -> Result<Json<Prediction>, ApiError> {
    sample.validate_domains()?;
    let out = state.gateway.predict(&build_features(&sample))?;
    Ok(Json(out))
}

async fn predict_simple(
    State(state): State<AppState>,
    Json(body): Json<SimpleSample>,
) -> Result<Json<Value>, ApiError> {
    let sample = ClinicalSample {
        age: body.age.map(|y| y * 365.0),
        ap_hi: body.bp,
        cholesterol: body.cholesterol,
        gender: body.gender.as_deref().map(gender_code),
        ..Default::default()
    };
    sample.validate_domains()?;
    let out = state.gateway.predict(&build_features(&sample))?;
    Ok(Json(json!({
        "prediction": out.prediction,
        "prob": out.prob,
        "note": "Missing fields sent as NaN.",
    })))
}

fn gender_code(text: &str) -> f64 {
    if text.to_lowercase().starts_with('m') {
        2.0
    } else {
        1.0
    }
}

// ── Explanation ──────────────────────────────────────────────────────

async fn explain_full(
    State(state): State<AppState>,
    Json(body): Json<ExplainRequest>,
) -> Result<Json<AttributionResult>, ApiError> {
    body.sample.validate_domains()?;
    let vector = build_features(&body.sample);
    let top_k = body.top_k.unwrap_or(DEFAULT_TOP_K);
    let out = state.explainer.explain(&vector, top_k)?;
    Ok(Json(out))
}

// ── Introspection / diagnostics ──────────────────────────────────────

async fn feature_names() -> Json<Value> {
    Json(json!({ "feature_order": FEATURE_COLUMNS }))
}

/// Human-readable labels keyed by raw column name, plus the expanded
/// names the active preprocessor emits (e.g. `cat__cholesterol_3`).
async fn feature_labels(State(state): State<AppState>) -> Json<Value> {
    let mut labels = serde_json::Map::new();
    for col in FEATURE_COLUMNS {
        if let Some(l) = base_label(col) {
            labels.insert(col.to_string(), l.into());
        }
    }
    if let Ok(loaded) = state.gateway.active() {
        if let Some(pre) = loaded.artifact.preprocessor() {
            for name in pre.output_names() {
                if let Some(l) = expanded_label(&name) {
                    labels.insert(name, l);
                }
            }
        }
    }
    Json(Value::Object(labels))
}

fn base_label(col: &str) -> Option<&'static str> {
    Some(match col {
        "age" => "Age (days)",
        "height" => "Height (cm)",
        "weight" => "Weight (kg)",
        "ap_hi" => "Systolic BP",
        "ap_lo" => "Diastolic BP",
        "age_years" => "Age (years)",
        "bmi" => "Body mass index",
        "bp_diff" => "Pulse pressure",
        "gender" => "Gender code",
        "cholesterol" => "Cholesterol level",
        "gluc" => "Glucose level",
        "smoke" => "Smoker",
        "alco" => "Alcohol intake",
        "active" => "Physically active",
        "gender_bin" => "Gender (male)",
        _ => return None,
    })
}

fn expanded_label(name: &str) -> Option<Value> {
    let base = name.split_once("__").map(|(_, b)| b).unwrap_or(name);
    if let Some(l) = base_label(base) {
        return Some(l.into());
    }
    // One-hot names carry the category value as a suffix.
    let (stem, value) = base.rsplit_once('_')?;
    base_label(stem).map(|l| format!("{l} = {value}").into())
}

async fn model_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.gateway.info()))
}

async fn debug_pipeline(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.gateway.debug_pipeline()?))
}

async fn ml_health(State(state): State<AppState>) -> Json<Value> {
    let loaded = state.gateway.is_loaded();
    Json(json!({
        "loaded": loaded,
        "model_type": loaded.then_some("gbdt_pipeline"),
    }))
}

async fn versions(State(state): State<AppState>) -> Json<Value> {
    let artifact = state
        .gateway
        .active()
        .ok()
        .map(|a| a.artifact.version.clone());
    Json(json!({ "service": VERSION, "artifact": artifact }))
}

// ── Reload ───────────────────────────────────────────────────────────

/// Replace the active artifact from an uploaded file. Validation failure
/// rejects the upload and leaves the previous artifact active; only a
/// validated artifact is written back to the configured path.
async fn reload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut bytes = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let data = field
            .bytes()
            .await
            .map_err(|e| CardioError::validation("file", e.to_string()))?;
        bytes = Some(data);
        break;
    }
    let bytes = bytes.ok_or_else(|| CardioError::validation("file", "no file uploaded"))?;

    let loaded = state.gateway.load_bytes(&bytes, "upload")?;

    // Persist so the next startup picks the new artifact up. Activation
    // already happened; a write failure is logged, not surfaced.
    let path = std::path::Path::new(&state.config.model.artifact_path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(error = %e, "could not create artifact directory");
        }
    }
    if let Err(e) = std::fs::write(path, &bytes) {
        warn!(path = %path.display(), error = %e, "reloaded artifact not written back");
    }

    Ok(Json(json!({
        "message": "Model reloaded successfully",
        "fingerprint": loaded.fingerprint,
        "version": loaded.artifact.version,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_text_maps_by_first_letter() {
        assert_eq!(gender_code("male"), 2.0);
        assert_eq!(gender_code("Male"), 2.0);
        assert_eq!(gender_code("female"), 1.0);
        assert_eq!(gender_code("f"), 1.0);
    }

    #[test]
    fn expanded_labels_cover_passthrough_and_one_hot_names() {
        assert_eq!(expanded_label("num__ap_hi"), Some("Systolic BP".into()));
        assert_eq!(
            expanded_label("cat__cholesterol_3"),
            Some("Cholesterol level = 3".into())
        );
        assert_eq!(expanded_label("num__nonsense"), None);
    }
}
