//! Column-wise preprocessing stage.
//!
//! Maps the 15-slot raw feature vector into the expanded numeric space the
//! classifier was trained on, with a stable, introspectable output-name
//! list (`{transformer}__{column}` / `{transformer}__{column}_{category}`).

use serde::{Deserialize, Serialize};

use cardio_core::constants::FEATURE_COLUMNS;
use cardio_core::errors::{CardioError, CardioResult};
use cardio_core::models::FeatureVector;

/// Column-wise transformer: a list of named sub-transformers, each applied
/// to a subset of the raw columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub transformers: Vec<SubTransformer>,
}

/// One named sub-transformer over named input columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTransformer {
    pub name: String,
    pub spec: TransformerSpec,
    pub columns: Vec<String>,
}

/// A sub-transformer is either a string sentinel or an encoder object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformerSpec {
    /// String sentinel: only `"passthrough"` and `"drop"` are accepted
    /// (enforced by artifact validation).
    Named(String),
    Encoder(EncoderSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderSpec {
    OneHot(OneHotSpec),
}

/// Fitted one-hot encoder: category lists per input column.
///
/// An input equal to a category produces 1.0 in that indicator; anything
/// else (including NaN) produces all zeros for the column, matching the
/// training-time unknown-handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotSpec {
    pub categories: Vec<Vec<f64>>,
}

impl ColumnTransformer {
    /// Structural checks beyond the string whitelist. Returns a message
    /// describing the first inconsistency.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        for sub in &self.transformers {
            for col in &sub.columns {
                if !FEATURE_COLUMNS.contains(&col.as_str()) {
                    return Err(format!(
                        "transformer '{}' references unknown column '{col}'",
                        sub.name
                    ));
                }
            }
            if let TransformerSpec::Encoder(EncoderSpec::OneHot(spec)) = &sub.spec {
                if spec.categories.len() != sub.columns.len() {
                    return Err(format!(
                        "transformer '{}': {} category lists for {} columns",
                        sub.name,
                        spec.categories.len(),
                        sub.columns.len()
                    ));
                }
            }
        }
        Ok(())
    }

    /// Run the preprocessing stage over one feature vector.
    pub fn transform(&self, vector: &FeatureVector) -> CardioResult<Vec<f64>> {
        let mut out = Vec::with_capacity(self.output_width());
        for sub in &self.transformers {
            match &sub.spec {
                TransformerSpec::Named(s) if s == "drop" => {}
                TransformerSpec::Named(_) => {
                    for col in &sub.columns {
                        out.push(column_value(vector, col)?);
                    }
                }
                TransformerSpec::Encoder(EncoderSpec::OneHot(spec)) => {
                    for (col, cats) in sub.columns.iter().zip(&spec.categories) {
                        let value = column_value(vector, col)?;
                        for cat in cats {
                            out.push(if value == *cat { 1.0 } else { 0.0 });
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Stable expanded-feature names, matching `transform` output order.
    pub fn output_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.output_width());
        for sub in &self.transformers {
            match &sub.spec {
                TransformerSpec::Named(s) if s == "drop" => {}
                TransformerSpec::Named(_) => {
                    for col in &sub.columns {
                        names.push(format!("{}__{}", sub.name, col));
                    }
                }
                TransformerSpec::Encoder(EncoderSpec::OneHot(spec)) => {
                    for (col, cats) in sub.columns.iter().zip(&spec.categories) {
                        for cat in cats {
                            names.push(format!("{}__{}_{}", sub.name, col, cat));
                        }
                    }
                }
            }
        }
        names
    }

    /// Width of the expanded feature space.
    pub fn output_width(&self) -> usize {
        self.transformers
            .iter()
            .map(|sub| match &sub.spec {
                TransformerSpec::Named(s) if s == "drop" => 0,
                TransformerSpec::Named(_) => sub.columns.len(),
                TransformerSpec::Encoder(EncoderSpec::OneHot(spec)) => {
                    spec.categories.iter().map(Vec::len).sum()
                }
            })
            .sum()
    }
}

fn column_value(vector: &FeatureVector, column: &str) -> CardioResult<f64> {
    vector
        .get(column)
        .ok_or_else(|| CardioError::inference(format!("unknown feature column '{column}'")))
}
