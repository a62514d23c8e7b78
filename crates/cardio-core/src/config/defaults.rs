//! Default configuration values.

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ARTIFACT_PATH: &str = "models/cardio_model.json";
pub const DEFAULT_DB_PATH: &str = "data/vitals.db";
pub const DEFAULT_TOPIC_PREFIX: &str = "cardio/vitals";
pub const DEFAULT_FRAME_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_PERSIST_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_SIMULATE_INTERVAL_MS: u64 = 2000;
