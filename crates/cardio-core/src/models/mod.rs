//! Domain models shared across the workspace.

mod attribution;
mod clinical_sample;
mod feature_vector;
mod vital_reading;

pub use attribution::{AttributionResult, ContributionItem};
pub use clinical_sample::ClinicalSample;
pub use feature_vector::FeatureVector;
pub use vital_reading::{StoredVitalReading, VitalReading};
