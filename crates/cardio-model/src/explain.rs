//! Additive tree-path attribution.
//!
//! Decomposes one prediction into a baseline log-odds (the cover-weighted
//! expected output of the ensemble) plus a signed contribution per expanded
//! feature, by walking each tree's decision path and attributing the change
//! in node expectation to the split feature. Contributions plus baseline
//! sum exactly to the predicted margin.

use std::sync::Arc;

use cardio_core::constants::DEFAULT_TOP_K;
use cardio_core::errors::{CardioError, CardioResult};
use cardio_core::models::{AttributionResult, ContributionItem, FeatureVector};

use crate::artifact::trees::sigmoid;
use crate::artifact::{GbdtClassifier, TreeNode};
use crate::gateway::ModelGateway;

/// Per-artifact attribution engine.
///
/// Construction walks every tree bottom-up to precompute cover-weighted
/// node expectations, which is the expensive part; the engine is therefore
/// cached per artifact fingerprint by the gateway.
pub struct TreeAttribution {
    /// Expected ensemble output per tree per node.
    expected: Vec<Vec<f64>>,
    /// Pre-data log-odds: base score + expected output of every tree root.
    baseline: f64,
}

/// One class's attribution row.
pub struct ClassRow {
    pub baseline: f64,
    pub contributions: Vec<f64>,
}

impl TreeAttribution {
    pub fn build(clf: &GbdtClassifier) -> Self {
        let mut expected = Vec::with_capacity(clf.trees.len());
        let mut baseline = clf.base_score;
        for tree in &clf.trees {
            let e = node_expectations(&tree.nodes);
            baseline += e.first().copied().unwrap_or(0.0);
            expected.push(e);
        }
        Self { expected, baseline }
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Signed contributions for one expanded-space row, in preprocessing
    /// output order.
    fn path_contributions(&self, clf: &GbdtClassifier, x: &[f64]) -> CardioResult<Vec<f64>> {
        let mut contributions = vec![0.0; x.len()];
        for (tree, expected) in clf.trees.iter().zip(&self.expected) {
            let mut idx = 0usize;
            for _ in 0..=tree.nodes.len() {
                let node = tree.nodes.get(idx).ok_or_else(|| {
                    CardioError::inference(format!("node index {idx} out of range"))
                })?;
                match node {
                    TreeNode::Leaf { .. } => break,
                    TreeNode::Split { feature, .. } => {
                        let feature = *feature;
                        let next = tree.route(node, x)?;
                        let slot = contributions.get_mut(feature).ok_or_else(|| {
                            CardioError::inference(format!(
                                "split references feature {feature} outside expanded space"
                            ))
                        })?;
                        *slot += expected[next] - expected[idx];
                        idx = next;
                    }
                }
            }
        }
        Ok(contributions)
    }

    /// Attribution rows per class: index 0 is the low-risk class, index 1
    /// the high-risk class. For a margin-output binary ensemble the rows
    /// are sign mirrors of each other.
    pub fn class_rows(&self, clf: &GbdtClassifier, x: &[f64]) -> CardioResult<Vec<ClassRow>> {
        let positive = self.path_contributions(clf, x)?;
        let negative = positive.iter().map(|v| -v).collect();
        Ok(vec![
            ClassRow {
                baseline: -self.baseline,
                contributions: negative,
            },
            ClassRow {
                baseline: self.baseline,
                contributions: positive,
            },
        ])
    }
}

/// Cover-weighted expected value of every node, computed bottom-up.
/// Node links always descend (validated at load), so a reverse index scan
/// sees children before parents.
fn node_expectations(nodes: &[TreeNode]) -> Vec<f64> {
    let mut expected = vec![0.0; nodes.len()];
    for i in (0..nodes.len()).rev() {
        expected[i] = match &nodes[i] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { left, right, .. } => {
                let (cl, cr) = (nodes[*left].cover(), nodes[*right].cover());
                let total = cl + cr;
                if total > 0.0 {
                    (cl * expected[*left] + cr * expected[*right]) / total
                } else {
                    (expected[*left] + expected[*right]) / 2.0
                }
            }
        };
    }
    expected
}

/// Turns a transformed feature vector into a ranked attribution result.
pub struct Explainer {
    gateway: Arc<ModelGateway>,
}

impl Explainer {
    pub fn new(gateway: Arc<ModelGateway>) -> Self {
        Self { gateway }
    }

    pub fn default_top_k() -> usize {
        DEFAULT_TOP_K
    }

    /// Explain one sample against the active artifact.
    pub fn explain(&self, vector: &FeatureVector, top_k: usize) -> CardioResult<AttributionResult> {
        // Pin one artifact for the whole call; a concurrent swap must not
        // mix stages from different artifacts.
        let loaded = self.gateway.active()?;
        let (row, names) = loaded.transform(vector)?;
        let clf = loaded.classifier_stage()?;
        let engine = self.gateway.attribution_engine(&loaded)?;

        let rows = engine.class_rows(clf, &row)?;
        // The positive/high-risk class's row and baseline, always. This is
        // a fixed convention, not configurable.
        let class1 = rows
            .into_iter()
            .nth(1)
            .ok_or_else(|| CardioError::inference("attribution produced no class-1 row"))?;

        let margin = class1.baseline + class1.contributions.iter().sum::<f64>();
        let prob = if clf.probability {
            Some(sigmoid(margin))
        } else {
            None
        };

        // Rank by absolute magnitude, descending. The sort is stable, so
        // ties keep preprocessing output order (first occurrence wins).
        let mut ranked: Vec<ContributionItem> = names
            .into_iter()
            .zip(&class1.contributions)
            .map(|(feature, value)| ContributionItem {
                feature,
                value: *value,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.value
                .abs()
                .partial_cmp(&a.value.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let top_up = ranked
            .iter()
            .filter(|c| c.value > 0.0)
            .take(top_k)
            .cloned()
            .collect();
        let top_down = ranked
            .iter()
            .filter(|c| c.value < 0.0)
            .take(top_k)
            .cloned()
            .collect();

        Ok(AttributionResult {
            prediction: if margin >= 0.0 { 1 } else { 0 },
            prob,
            base_value: class1.baseline,
            base_prob: sigmoid(class1.baseline),
            top_up,
            top_down,
            contributions: ranked,
        })
    }
}
