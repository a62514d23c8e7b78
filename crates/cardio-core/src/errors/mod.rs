//! Error taxonomy for the CardioAI service.
//!
//! Validation and artifact errors are always reported synchronously to the
//! direct caller. Telemetry-validation and persistence failures are absorbed
//! at their boundary (logged, never surfaced) so the hot path never stalls.

mod artifact_error;
mod storage_error;

pub use artifact_error::ArtifactError;
pub use storage_error::StorageError;

/// Top-level error type for the CardioAI service.
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    /// Malformed or out-of-domain input field. Never silently coerced,
    /// except for the documented missing-value → NaN rule.
    #[error("validation failed for '{field}': {constraint}")]
    Validation { field: String, constraint: String },

    /// The pipeline artifact failed shape or whitelist validation on load.
    /// The previously active artifact remains untouched.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The loaded pipeline failed during predict/transform. Usually a
    /// malformed feature vector, so treated as a client-visible error.
    #[error("inference failed: {message}")]
    Inference { message: String },

    /// No artifact loaded yet. Distinct from `Inference` so callers can
    /// tell "not ready" from "bad input".
    #[error("model not loaded")]
    Unavailable,

    /// SQLite-layer failure in the history store.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CardioError {
    /// Shorthand for a field validation error.
    pub fn validation(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Shorthand for an inference error wrapping an underlying message.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the workspace.
pub type CardioResult<T> = Result<T, CardioError>;

/// Convert a rusqlite-layer message into a storage error.
pub fn to_storage_err(message: impl Into<String>) -> CardioError {
    CardioError::Storage(StorageError::Sqlite {
        message: message.into(),
    })
}
