//! Service configuration, loaded from an optional TOML file.
//!
//! Every section has serde defaults so an empty (or absent) file yields a
//! runnable configuration. `CARDIO_CONFIG` overrides the file path.

mod defaults;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardioConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

/// Model artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path the artifact is loaded from at startup and rewritten on reload.
    pub artifact_path: String,
}

/// History store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file for the vitals history.
    pub db_path: String,
}

/// Telemetry ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Topic prefix for per-patient vitals, e.g. `cardio/vitals`.
    pub topic_prefix: String,
    /// Capacity of the inbound telemetry frame channel.
    pub frame_queue_capacity: usize,
    /// Capacity of the bounded persistence queue.
    pub persist_queue_capacity: usize,
    /// Run the in-process vitals simulator.
    pub simulate: bool,
    /// Simulator emission interval in milliseconds.
    pub simulate_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::DEFAULT_PORT,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: defaults::DEFAULT_ARTIFACT_PATH.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            topic_prefix: defaults::DEFAULT_TOPIC_PREFIX.to_string(),
            frame_queue_capacity: defaults::DEFAULT_FRAME_QUEUE_CAPACITY,
            persist_queue_capacity: defaults::DEFAULT_PERSIST_QUEUE_CAPACITY,
            simulate: false,
            simulate_interval_ms: defaults::DEFAULT_SIMULATE_INTERVAL_MS,
        }
    }
}

impl CardioConfig {
    /// Load configuration from `CARDIO_CONFIG` (or `cardio.toml` in the
    /// working directory). A missing file yields the defaults.
    pub fn load() -> std::io::Result<Self> {
        let path =
            std::env::var("CARDIO_CONFIG").unwrap_or_else(|_| "cardio.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> std::io::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
