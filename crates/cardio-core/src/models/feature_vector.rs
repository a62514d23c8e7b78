use serde::{Deserialize, Serialize};

use crate::constants::{FEATURE_COLUMNS, FEATURE_COUNT};

/// Fixed-length, fixed-order numeric feature vector.
///
/// Slot order is `FEATURE_COLUMNS` — part of the inference contract.
/// Missing values are represented as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    /// All slots missing.
    pub fn empty() -> Self {
        Self([f64::NAN; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a slot by column name.
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.0[i])
    }

    /// Index of a column name in the fixed order.
    pub fn column_index(column: &str) -> Option<usize> {
        FEATURE_COLUMNS.iter().position(|c| *c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_name_matches_declared_order() {
        let mut slots = [0.0; FEATURE_COUNT];
        slots[0] = 20075.0;
        slots[5] = 55.0;
        let v = FeatureVector(slots);
        assert_eq!(v.get("age"), Some(20075.0));
        assert_eq!(v.get("age_years"), Some(55.0));
        assert_eq!(v.get("nonexistent"), None);
    }

    #[test]
    fn empty_vector_is_all_nan() {
        let v = FeatureVector::empty();
        assert!(v.as_slice().iter().all(|x| x.is_nan()));
    }
}
