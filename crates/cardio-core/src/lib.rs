//! # cardio-core
//!
//! Foundation crate for the CardioAI risk service.
//! Defines all domain types, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;

// Re-export the most commonly used types at the crate root.
pub use config::CardioConfig;
pub use errors::{CardioError, CardioResult};
pub use models::{
    AttributionResult, ClinicalSample, ContributionItem, FeatureVector, StoredVitalReading,
    VitalReading,
};
