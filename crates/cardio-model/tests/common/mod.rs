//! Shared fixtures: a small but fully-shaped stub pipeline artifact.
#![allow(dead_code)]

use cardio_model::artifact::{
    ColumnTransformer, EncoderSpec, GbdtClassifier, OneHotSpec, PipelineArtifact, PipelineStep,
    StepKind, SubTransformer, TransformerSpec, Tree, TreeNode,
};

pub const NUMERIC_COLUMNS: [&str; 8] = [
    "age", "height", "weight", "ap_hi", "ap_lo", "age_years", "bmi", "bp_diff",
];
pub const CATEGORICAL_COLUMNS: [&str; 7] = [
    "gender", "cholesterol", "gluc", "smoke", "alco", "active", "gender_bin",
];

fn categories() -> Vec<Vec<f64>> {
    vec![
        vec![1.0, 2.0],      // gender
        vec![1.0, 2.0, 3.0], // cholesterol
        vec![1.0, 2.0, 3.0], // gluc
        vec![0.0, 1.0],      // smoke
        vec![0.0, 1.0],      // alco
        vec![0.0, 1.0],      // active
        vec![0.0, 1.0],      // gender_bin
    ]
}

/// Expanded width of the stub preprocessor: 8 numeric + 16 indicators.
pub const EXPANDED_WIDTH: usize = 24;

/// Index of `ap_hi` in the expanded space.
pub const X_AP_HI: usize = 3;
/// Index of the `cholesterol == 3` indicator in the expanded space.
pub const X_CHOL_3: usize = 12;

pub fn stub_preprocessor() -> ColumnTransformer {
    ColumnTransformer {
        transformers: vec![
            SubTransformer {
                name: "num".to_string(),
                spec: TransformerSpec::Named("passthrough".to_string()),
                columns: NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            },
            SubTransformer {
                name: "cat".to_string(),
                spec: TransformerSpec::Encoder(EncoderSpec::OneHot(OneHotSpec {
                    categories: categories(),
                })),
                columns: CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            },
        ],
    }
}

fn split(feature: usize, threshold: f64, leaves: (f64, f64), covers: (f64, f64)) -> Tree {
    Tree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                default_left: true,
                cover: covers.0 + covers.1,
            },
            TreeNode::Leaf {
                value: leaves.0,
                cover: covers.0,
            },
            TreeNode::Leaf {
                value: leaves.1,
                cover: covers.1,
            },
        ],
    }
}

/// Two-tree stub classifier: one split on systolic pressure (>= 130 raises
/// risk), one on the cholesterol=3 indicator.
pub fn stub_classifier() -> GbdtClassifier {
    GbdtClassifier {
        base_score: -0.3,
        probability: true,
        trees: vec![
            split(X_AP_HI, 130.0, (-0.4, 0.7), (60.0, 40.0)),
            split(X_CHOL_3, 0.5, (-0.1, 0.5), (70.0, 30.0)),
        ],
    }
}

pub fn stub_artifact() -> PipelineArtifact {
    PipelineArtifact {
        version: "stub-1".to_string(),
        steps: vec![
            PipelineStep {
                name: "pre".to_string(),
                kind: StepKind::ColumnTransformer(stub_preprocessor()),
            },
            PipelineStep {
                name: "clf".to_string(),
                kind: StepKind::Classifier(stub_classifier()),
            },
        ],
    }
}

pub fn stub_artifact_bytes() -> Vec<u8> {
    serde_json::to_vec(&stub_artifact()).expect("stub artifact serializes")
}
