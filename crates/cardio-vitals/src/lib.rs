//! # cardio-vitals
//!
//! Real-time vitals path: telemetry ingestion, last-write-wins latest
//! cache, durable SQLite history, and the live feed surface.

pub mod cache;
pub mod feed;
pub mod history;
pub mod ingest;

pub use cache::LatestCache;
pub use feed::LiveFeed;
pub use history::HistoryStore;
pub use ingest::{TelemetryFrame, VitalsIngestor};
