//! Latest-reading cache — concurrent per-patient access via DashMap.
//!
//! Last-write-wins by arrival order, not timestamp order: the most recently
//! arrived reading occupies the slot even if its own timestamp is older.

use dashmap::DashMap;

use cardio_core::models::VitalReading;

/// In-memory mapping from patient identifier to most-recent reading.
///
/// The sole shared mutable state between the ingestion path and the read
/// paths; DashMap shards keep writers from blocking readers beyond a
/// bounded per-shard critical section.
pub struct LatestCache {
    latest: DashMap<String, VitalReading>,
}

impl LatestCache {
    pub fn new() -> Self {
        Self {
            latest: DashMap::new(),
        }
    }

    /// Replace the patient's slot with this reading, unconditionally.
    pub fn update(&self, reading: VitalReading) {
        self.latest.insert(reading.patient.clone(), reading);
    }

    /// The most recently arrived reading for a patient (cloned snapshot).
    pub fn get(&self, patient: &str) -> Option<VitalReading> {
        self.latest.get(patient).map(|r| r.clone())
    }

    /// Number of patients with a cached reading.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// All patient identifiers currently cached.
    pub fn patients(&self) -> Vec<String> {
        self.latest.iter().map(|r| r.key().clone()).collect()
    }
}

impl Default for LatestCache {
    fn default() -> Self {
        Self::new()
    }
}
