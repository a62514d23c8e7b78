//! Telemetry ingestion.
//!
//! Per inbound frame: parse + validate (invalid frames are dropped at the
//! boundary — the channel has no feedback path to the sender), update the
//! latest cache, publish to live observers, and schedule a durable append
//! on a bounded queue consumed by a dedicated persistence task. A slow or
//! failing store never backpressures the telemetry channel.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cardio_core::errors::CardioResult;
use cardio_core::models::VitalReading;

use crate::cache::LatestCache;
use crate::history::HistoryStore;

/// One raw message from the telemetry channel.
///
/// Topics are scoped per patient (`cardio/vitals/{patient}`); the payload
/// is a JSON-encoded [`VitalReading`].
#[derive(Debug, Clone)]
pub struct TelemetryFrame {
    pub topic: String,
    pub payload: Vec<u8>,
}

pub struct VitalsIngestor {
    cache: Arc<LatestCache>,
    updates: broadcast::Sender<VitalReading>,
    persist_tx: mpsc::Sender<VitalReading>,
}

impl VitalsIngestor {
    pub fn new(
        cache: Arc<LatestCache>,
        updates: broadcast::Sender<VitalReading>,
        persist_tx: mpsc::Sender<VitalReading>,
    ) -> Self {
        Self {
            cache,
            updates,
            persist_tx,
        }
    }

    /// Admit one validated-or-rejected reading: cache update (last write
    /// wins), live publish, persistence enqueue.
    ///
    /// Also used by the direct HTTP push fallback, which surfaces the
    /// validation error to its caller instead of absorbing it.
    pub fn admit(&self, reading: VitalReading) -> CardioResult<()> {
        reading.validate()?;

        self.cache.update(reading.clone());
        // No live observers is not an error.
        let _ = self.updates.send(reading.clone());

        match self.persist_tx.try_send(reading) {
            Ok(()) => {}
            Err(TrySendError::Full(r)) => {
                // Bounded-queue policy: reject the incoming append. The
                // reading stays visible in the cache without a durable
                // record — the accepted inconsistency.
                warn!(patient = %r.patient, "persistence queue full, dropping history append");
            }
            Err(TrySendError::Closed(r)) => {
                warn!(patient = %r.patient, "persistence worker stopped, dropping history append");
            }
        }
        Ok(())
    }

    /// Consume the telemetry channel until it closes.
    pub async fn run(self: Arc<Self>, mut frames: mpsc::Receiver<TelemetryFrame>) {
        while let Some(frame) = frames.recv().await {
            self.handle_frame(frame);
        }
        info!("telemetry channel closed, ingestor stopping");
    }

    fn handle_frame(&self, frame: TelemetryFrame) {
        let reading: VitalReading = match serde_json::from_slice(&frame.payload) {
            Ok(r) => r,
            Err(e) => {
                debug!(topic = %frame.topic, error = %e, "dropping unparseable telemetry frame");
                return;
            }
        };
        if let Err(e) = self.admit(reading) {
            debug!(topic = %frame.topic, error = %e, "dropping invalid reading");
        }
    }
}

/// Dedicated persistence task consuming the bounded append queue.
///
/// Failures are logged and absorbed; ingestion never stalls on storage.
pub fn spawn_persistence_worker(
    history: Arc<HistoryStore>,
    mut rx: mpsc::Receiver<VitalReading>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(reading) = rx.recv().await {
            let store = Arc::clone(&history);
            let patient = reading.patient.clone();
            match tokio::task::spawn_blocking(move || store.append(&reading)).await {
                Ok(Ok(id)) => debug!(id, patient = %patient, "reading persisted"),
                Ok(Err(e)) => {
                    warn!(patient = %patient, error = %e, "history append failed, reading remains cache-only");
                }
                Err(e) => warn!(patient = %patient, error = %e, "persistence task failed"),
            }
        }
        info!("persistence queue closed, worker stopping");
    })
}
