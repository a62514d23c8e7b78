use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DBP_RANGE, HR_RANGE, PATIENT_ID_MAX_LEN, PATIENT_ID_MIN_LEN, RR_RANGE, SBP_RANGE, SPO2_RANGE,
};
use crate::errors::{CardioError, CardioResult};

fn default_source() -> Option<String> {
    Some("sim".to_string())
}

/// A single vital-sign reading for one patient.
///
/// Immutable once created. Persisted append-only; superseded in the latest
/// cache by any later-arriving reading for the same patient (arrival order,
/// not timestamp order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalReading {
    /// Patient identifier.
    pub patient: String,
    /// Measurement timestamp.
    pub ts: DateTime<Utc>,
    /// Heart rate, beats per minute.
    #[serde(default)]
    pub hr: Option<i64>,
    /// Oxygen saturation, percent.
    #[serde(default)]
    pub spo2: Option<i64>,
    /// Systolic blood pressure.
    #[serde(default)]
    pub sbp: Option<i64>,
    /// Diastolic blood pressure.
    #[serde(default)]
    pub dbp: Option<i64>,
    /// Respiration rate, breaths per minute.
    #[serde(default)]
    pub rr: Option<i64>,
    /// Acquisition mode tag.
    #[serde(default)]
    pub mode: Option<String>,
    /// Source tag.
    #[serde(default = "default_source")]
    pub source: Option<String>,
}

impl VitalReading {
    /// Validate the patient identifier and every present vital against its
    /// inclusive bound. Out-of-bound values are rejected, not clamped.
    pub fn validate(&self) -> CardioResult<()> {
        let len = self.patient.len();
        if !(PATIENT_ID_MIN_LEN..=PATIENT_ID_MAX_LEN).contains(&len) {
            return Err(CardioError::validation(
                "patient",
                format!("length must be {PATIENT_ID_MIN_LEN}..={PATIENT_ID_MAX_LEN}"),
            ));
        }
        check_bound("hr", self.hr, HR_RANGE)?;
        check_bound("spo2", self.spo2, SPO2_RANGE)?;
        check_bound("sbp", self.sbp, SBP_RANGE)?;
        check_bound("dbp", self.dbp, DBP_RANGE)?;
        check_bound("rr", self.rr, RR_RANGE)?;
        Ok(())
    }
}

fn check_bound(field: &str, value: Option<i64>, (lo, hi): (i64, i64)) -> CardioResult<()> {
    if let Some(v) = value {
        if v < lo || v > hi {
            return Err(CardioError::validation(
                field,
                format!("must be within {lo}..={hi}, got {v}"),
            ));
        }
    }
    Ok(())
}

/// A reading as returned from the history store, with its store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVitalReading {
    pub id: i64,
    #[serde(flatten)]
    pub reading: VitalReading,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(patient: &str) -> VitalReading {
        VitalReading {
            patient: patient.to_string(),
            ts: Utc::now(),
            hr: Some(72),
            spo2: Some(98),
            sbp: Some(120),
            dbp: Some(80),
            rr: Some(16),
            mode: None,
            source: Some("sim".to_string()),
        }
    }

    #[test]
    fn in_bound_reading_validates() {
        assert!(reading("p1").validate().is_ok());
    }

    #[test]
    fn heart_rate_above_bound_is_rejected() {
        let mut r = reading("p1");
        r.hr = Some(250);
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("hr"));
    }

    #[test]
    fn absent_vitals_pass() {
        let mut r = reading("p1");
        r.hr = None;
        r.spo2 = None;
        r.sbp = None;
        r.dbp = None;
        r.rr = None;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn empty_patient_is_rejected() {
        assert!(reading("").validate().is_err());
    }

    #[test]
    fn long_patient_is_rejected() {
        assert!(reading(&"x".repeat(65)).validate().is_err());
    }

    #[test]
    fn source_defaults_to_sim_when_absent() {
        let json = r#"{"patient":"p1","ts":"2025-01-01T00:00:00Z","hr":70}"#;
        let r: VitalReading = serde_json::from_str(json).unwrap();
        assert_eq!(r.source.as_deref(), Some("sim"));
        assert_eq!(r.spo2, None);
    }
}
