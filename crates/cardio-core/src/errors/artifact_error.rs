/// Load-time artifact validation errors.
///
/// Each variant names the specific violated invariant so operators can tell
/// exactly why an upload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found at {path}")]
    NotFound { path: String },

    #[error("artifact could not be deserialized: {message}")]
    Malformed { message: String },

    #[error("invalid pipeline: expected exactly 2 steps, got {count}")]
    WrongStepCount { count: usize },

    #[error("invalid pipeline: step 'pre' must be a column transformer")]
    MissingPreprocessor,

    #[error("invalid pipeline: second step must be a classifier")]
    MissingClassifier,

    #[error("invalid transformer '{name}': got {value:?}")]
    DisallowedTransformer { name: String, value: String },
}
