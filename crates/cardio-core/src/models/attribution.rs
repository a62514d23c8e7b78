use serde::{Deserialize, Serialize};

/// One signed per-feature contribution, in the expanded feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionItem {
    /// Expanded-feature name, e.g. `cat__gender_bin_1`.
    pub feature: String,
    /// Signed contribution to the predicted log-odds.
    pub value: f64,
}

/// Additive attribution of a single prediction.
///
/// `contributions` plus `base_value` sum (within floating-point tolerance)
/// to the log-odds of the reported probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionResult {
    /// Predicted class, 0 or 1.
    pub prediction: i64,
    /// Class-1 probability.
    pub prob: Option<f64>,
    /// Pre-data log-odds of the pipeline (expected value over background).
    pub base_value: f64,
    /// Sigmoid of `base_value`.
    pub base_prob: f64,
    /// Top contributors pushing risk up, by descending magnitude.
    pub top_up: Vec<ContributionItem>,
    /// Top contributors pushing risk down, by descending magnitude.
    pub top_down: Vec<ContributionItem>,
    /// All contributions, ranked by descending magnitude.
    pub contributions: Vec<ContributionItem>,
}
