use std::sync::Arc;

use cardio_core::CardioConfig;
use cardio_model::{Explainer, ModelGateway};
use cardio_vitals::{HistoryStore, LatestCache, LiveFeed, VitalsIngestor};

/// Shared handles for every request handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ModelGateway>,
    pub explainer: Arc<Explainer>,
    pub cache: Arc<LatestCache>,
    pub history: Arc<HistoryStore>,
    pub ingestor: Arc<VitalsIngestor>,
    pub feed: Arc<LiveFeed>,
    pub config: Arc<CardioConfig>,
}
