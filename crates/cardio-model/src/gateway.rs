//! ModelGateway — owns the active inference pipeline.
//!
//! Loads and validates artifacts, swaps the active reference atomically,
//! and serves predict/transform against one consistent artifact. In-flight
//! calls hold an `Arc` to whichever artifact was active when they started;
//! a swap is a single reference replacement under a short write lock.

use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::Serialize;
use tracing::{info, warn};

use cardio_core::errors::{ArtifactError, CardioError, CardioResult};
use cardio_core::models::FeatureVector;

use crate::artifact::{PipelineArtifact, TransformerSpec};
use crate::explain::TreeAttribution;

/// A validated artifact together with its identity.
#[derive(Debug)]
pub struct LoadedArtifact {
    pub artifact: PipelineArtifact,
    /// blake3 hash of the serialized bytes; keys the attribution cache.
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
    /// Where the artifact came from (file path or "upload").
    pub source: String,
}

/// Discrete prediction plus optional class-1 probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: i64,
    pub prob: Option<f64>,
}

/// Introspection snapshot for diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_feature_names_out: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_feature_count: Option<usize>,
}

pub struct ModelGateway {
    active: RwLock<Option<Arc<LoadedArtifact>>>,
    /// Attribution engines are expensive to build; cached per artifact
    /// fingerprint and invalidated wholesale on every successful load.
    engines: Cache<String, Arc<TreeAttribution>>,
}

impl ModelGateway {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
            engines: Cache::new(4),
        }
    }

    /// Load and activate an artifact from a file.
    ///
    /// On any failure the previously active artifact stays active.
    pub fn load(&self, path: &Path) -> CardioResult<Arc<LoadedArtifact>> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ArtifactError::Malformed {
                    message: e.to_string(),
                }
            }
        })?;
        self.load_bytes(&bytes, &path.display().to_string())
    }

    /// Load and activate an artifact from raw bytes (operator upload).
    pub fn load_bytes(&self, bytes: &[u8], source: &str) -> CardioResult<Arc<LoadedArtifact>> {
        let artifact = PipelineArtifact::from_bytes(bytes)?;
        if let Err(e) = artifact.validate() {
            warn!(source, error = %e, "artifact rejected, previous artifact stays active");
            return Err(e.into());
        }

        let loaded = Arc::new(LoadedArtifact {
            fingerprint: blake3::hash(bytes).to_hex().to_string(),
            loaded_at: Utc::now(),
            source: source.to_string(),
            artifact,
        });

        // The swap itself: one reference replacement under the write lock.
        {
            let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
            *active = Some(Arc::clone(&loaded));
        }
        // Stale artifacts must never be explained.
        self.engines.invalidate_all();

        info!(
            fingerprint = %loaded.fingerprint,
            source,
            version = %loaded.artifact.version,
            "artifact loaded and activated"
        );
        Ok(loaded)
    }

    /// The currently active artifact, or `Unavailable`.
    pub fn active(&self) -> CardioResult<Arc<LoadedArtifact>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(CardioError::Unavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Run the full pipeline over one feature vector.
    pub fn predict(&self, vector: &FeatureVector) -> CardioResult<Prediction> {
        let loaded = self.active()?;
        let (row, _) = loaded.transform(vector)?;
        let clf = loaded.classifier_stage()?;
        Ok(Prediction {
            prediction: clf.predict(&row)?,
            prob: clf.predict_proba(&row)?,
        })
    }

    /// Run only the preprocessing stage: expanded row + stable names.
    pub fn transform(&self, vector: &FeatureVector) -> CardioResult<(Vec<f64>, Vec<String>)> {
        let loaded = self.active()?;
        loaded.transform(vector)
    }

    /// The cached attribution engine for an artifact.
    pub fn attribution_engine(
        &self,
        loaded: &Arc<LoadedArtifact>,
    ) -> CardioResult<Arc<TreeAttribution>> {
        let clf = loaded.classifier_stage()?;
        Ok(self
            .engines
            .get_with(loaded.fingerprint.clone(), || {
                Arc::new(TreeAttribution::build(clf))
            }))
    }

    /// Snapshot for `model_info`.
    pub fn info(&self) -> ModelInfo {
        match self.active() {
            Err(_) => ModelInfo {
                loaded: false,
                version: None,
                fingerprint: None,
                pre_feature_names_out: None,
                pre_feature_count: None,
            },
            Ok(loaded) => {
                let names = loaded.artifact.preprocessor().map(|p| p.output_names());
                ModelInfo {
                    loaded: true,
                    version: Some(loaded.artifact.version.clone()),
                    fingerprint: Some(loaded.fingerprint.clone()),
                    pre_feature_count: names.as_ref().map(Vec::len),
                    pre_feature_names_out: names,
                }
            }
        }
    }

    /// Structural dump for `debug_pipeline`.
    pub fn debug_pipeline(&self) -> CardioResult<serde_json::Value> {
        let loaded = self.active()?;
        let pre = loaded.artifact.preprocessor();
        let transformers: Vec<serde_json::Value> = pre
            .map(|p| {
                p.transformers
                    .iter()
                    .map(|sub| {
                        serde_json::json!({
                            "name": sub.name,
                            "type": match &sub.spec {
                                TransformerSpec::Named(s) => s.clone(),
                                TransformerSpec::Encoder(_) => "one_hot".to_string(),
                            },
                            "cols": sub.columns,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(serde_json::json!({
            "steps": loaded.artifact.step_names(),
            "pre_transformers": transformers,
            "fingerprint": loaded.fingerprint,
            "loaded_at": loaded.loaded_at.to_rfc3339(),
            "source": loaded.source,
        }))
    }
}

impl Default for ModelGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadedArtifact {
    /// Run the preprocessing stage: expanded row + stable names.
    pub fn transform(&self, vector: &FeatureVector) -> CardioResult<(Vec<f64>, Vec<String>)> {
        let pre = self
            .artifact
            .preprocessor()
            .ok_or_else(|| CardioError::inference("pipeline has no preprocessing stage"))?;
        Ok((pre.transform(vector)?, pre.output_names()))
    }

    /// The classifier stage of a validated artifact.
    pub fn classifier_stage(&self) -> CardioResult<&crate::artifact::GbdtClassifier> {
        self.artifact
            .classifier()
            .ok_or_else(|| CardioError::inference("pipeline has no classifier stage"))
    }
}
