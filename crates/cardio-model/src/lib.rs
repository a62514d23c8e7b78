//! # cardio-model
//!
//! The inference side of the CardioAI service: raw-sample feature
//! engineering, the serialized pipeline artifact format, the model gateway
//! (load / validate / atomic hot-swap), and additive tree-path attribution.

pub mod artifact;
pub mod explain;
pub mod features;
pub mod gateway;

pub use artifact::PipelineArtifact;
pub use explain::Explainer;
pub use gateway::{LoadedArtifact, ModelGateway, Prediction};
