//! Serialized inference-pipeline artifact.
//!
//! An artifact is a two-stage pipeline: a named column-transformer
//! preprocessing stage followed by a named classifier stage. The JSON shape
//! is validated at load time; anything outside the expected shape means an
//! incompatible artifact and the load fails.

pub mod columns;
pub mod trees;

use serde::{Deserialize, Serialize};

use cardio_core::constants::{ALLOWED_STRING_TRANSFORMERS, PREPROCESSOR_STEP};
use cardio_core::errors::ArtifactError;

pub use columns::{ColumnTransformer, EncoderSpec, OneHotSpec, SubTransformer, TransformerSpec};
pub use trees::{GbdtClassifier, Tree, TreeNode};

/// A versioned, serialized inference pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    #[serde(default)]
    pub version: String,
    pub steps: Vec<PipelineStep>,
}

/// One named pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    ColumnTransformer(ColumnTransformer),
    Classifier(GbdtClassifier),
}

impl PipelineArtifact {
    /// Deserialize an artifact from raw JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        serde_json::from_slice(bytes).map_err(|e| ArtifactError::Malformed {
            message: e.to_string(),
        })
    }

    /// Enforce the two-stage shape and the string-transformer whitelist.
    ///
    /// Rejection reasons name the specific violated invariant so a caller
    /// can distinguish wrong step count from a disallowed transformer.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.steps.len() != 2 {
            return Err(ArtifactError::WrongStepCount {
                count: self.steps.len(),
            });
        }

        let pre = match &self.steps[0] {
            PipelineStep {
                name,
                kind: StepKind::ColumnTransformer(ct),
            } if name == PREPROCESSOR_STEP => ct,
            _ => return Err(ArtifactError::MissingPreprocessor),
        };

        for sub in &pre.transformers {
            if let TransformerSpec::Named(value) = &sub.spec {
                if !ALLOWED_STRING_TRANSFORMERS.contains(&value.as_str()) {
                    return Err(ArtifactError::DisallowedTransformer {
                        name: sub.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        pre.check_structure()
            .map_err(|message| ArtifactError::Malformed { message })?;

        match &self.steps[1].kind {
            StepKind::Classifier(clf) => clf
                .check_structure()
                .map_err(|message| ArtifactError::Malformed { message })?,
            _ => return Err(ArtifactError::MissingClassifier),
        }

        Ok(())
    }

    /// The validated preprocessing stage. `None` on an unvalidated shape.
    pub fn preprocessor(&self) -> Option<&ColumnTransformer> {
        match self.steps.first() {
            Some(PipelineStep {
                kind: StepKind::ColumnTransformer(ct),
                ..
            }) => Some(ct),
            _ => None,
        }
    }

    /// The validated classifier stage. `None` on an unvalidated shape.
    pub fn classifier(&self) -> Option<&GbdtClassifier> {
        match self.steps.get(1) {
            Some(PipelineStep {
                kind: StepKind::Classifier(clf),
                ..
            }) => Some(clf),
            _ => None,
        }
    }

    /// Step names, in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}
