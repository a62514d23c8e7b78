/// CardioAI system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Raw feature column order expected by the inference pipeline.
///
/// This order is part of the training-time contract and must never change
/// independently of the loaded model artifact.
pub const FEATURE_COLUMNS: [&str; 15] = [
    "age",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "age_years",
    "bmi",
    "bp_diff",
    "gender",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
    "gender_bin",
];

/// Number of slots in a feature vector.
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Pipeline step name required for the preprocessing stage.
pub const PREPROCESSOR_STEP: &str = "pre";

/// String sub-transformer sentinels allowed inside the preprocessing stage.
pub const ALLOWED_STRING_TRANSFORMERS: [&str; 2] = ["passthrough", "drop"];

/// Default number of entries in each top-K attribution list.
pub const DEFAULT_TOP_K: usize = 6;

/// Default cap on history query results.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Interval between live-feed emissions, in milliseconds.
pub const LIVE_FEED_INTERVAL_MS: u64 = 1000;

/// Vital-sign bounds, inclusive. Readings outside these are rejected, never clamped.
pub const HR_RANGE: (i64, i64) = (20, 240);
pub const SPO2_RANGE: (i64, i64) = (50, 100);
pub const SBP_RANGE: (i64, i64) = (60, 260);
pub const DBP_RANGE: (i64, i64) = (30, 200);
pub const RR_RANGE: (i64, i64) = (5, 60);

/// Patient identifier length bounds.
pub const PATIENT_ID_MIN_LEN: usize = 1;
pub const PATIENT_ID_MAX_LEN: usize = 64;
