use serde::{Deserialize, Serialize};

use crate::errors::{CardioError, CardioResult};

/// Raw client-supplied clinical measurements.
///
/// Every field is individually optional; absent fields propagate as NaN
/// through derived-feature computation. Ordinal and binary fields, when
/// present, must lie in their declared domain — violations are validation
/// errors, never silent clamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicalSample {
    /// Age in days, to match training units.
    pub age: Option<f64>,
    /// Height in centimeters.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    /// Systolic blood pressure.
    pub ap_hi: Option<f64>,
    /// Diastolic blood pressure.
    pub ap_lo: Option<f64>,
    /// Cholesterol level, ordinal 1..=3.
    pub cholesterol: Option<f64>,
    /// Glucose level, ordinal 1..=3.
    pub gluc: Option<f64>,
    /// Smoking flag, 0 or 1.
    pub smoke: Option<f64>,
    /// Alcohol flag, 0 or 1.
    pub alco: Option<f64>,
    /// Physical activity flag, 0 or 1.
    pub active: Option<f64>,
    /// Gender code: 1 = female, 2 = male.
    pub gender: Option<f64>,
}

impl ClinicalSample {
    /// Check every present field against its declared domain.
    ///
    /// Absent fields pass (missing-value semantics apply downstream).
    pub fn validate_domains(&self) -> CardioResult<()> {
        check_ordinal("cholesterol", self.cholesterol)?;
        check_ordinal("gluc", self.gluc)?;
        check_binary("smoke", self.smoke)?;
        check_binary("alco", self.alco)?;
        check_binary("active", self.active)?;
        if let Some(g) = self.gender {
            if g != 1.0 && g != 2.0 {
                return Err(CardioError::validation(
                    "gender",
                    "must be 1 (female) or 2 (male)",
                ));
            }
        }
        Ok(())
    }
}

fn check_ordinal(field: &str, value: Option<f64>) -> CardioResult<()> {
    if let Some(v) = value {
        if v != 1.0 && v != 2.0 && v != 3.0 {
            return Err(CardioError::validation(field, "must be 1, 2, or 3"));
        }
    }
    Ok(())
}

fn check_binary(field: &str, value: Option<f64>) -> CardioResult<()> {
    if let Some(v) = value {
        if v != 0.0 && v != 1.0 {
            return Err(CardioError::validation(field, "must be 0 or 1"));
        }
    }
    Ok(())
}
