//! Live vitals feed.
//!
//! Two delivery shapes over the same data: periodic sampling of the latest
//! cache (the websocket loop polls at a fixed interval) and an event-driven
//! broadcast for observers that want every admitted reading as it arrives.

use std::sync::Arc;

use tokio::sync::broadcast;

use cardio_core::models::VitalReading;

use crate::cache::LatestCache;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

pub struct LiveFeed {
    cache: Arc<LatestCache>,
    updates: broadcast::Sender<VitalReading>,
}

impl LiveFeed {
    pub fn new(cache: Arc<LatestCache>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self { cache, updates }
    }

    /// Snapshot of the most recent reading for one patient, if any.
    pub fn poll(&self, patient: &str) -> Option<VitalReading> {
        self.cache.get(patient)
    }

    /// Subscribe to every admitted reading, all patients. Slow receivers
    /// lag and skip rather than backpressure the ingestor.
    pub fn subscribe(&self) -> broadcast::Receiver<VitalReading> {
        self.updates.subscribe()
    }

    /// Sender handle the ingestor publishes through.
    pub fn publisher(&self) -> broadcast::Sender<VitalReading> {
        self.updates.clone()
    }
}
