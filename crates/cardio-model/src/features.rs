//! Raw clinical fields → fixed-order feature vector.
//!
//! Pure transform, no I/O, safe to call concurrently. The derivation rules
//! (floor(age/365), weight/(height/100)^2, ap_hi - ap_lo, gender remap)
//! must exactly match the training-time contract of the loaded artifact.

use cardio_core::models::{ClinicalSample, FeatureVector};

fn nz(v: Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

/// Build the 15-slot feature vector from a raw sample.
///
/// Missing inputs propagate NaN into every derived slot that depends on
/// them and into no other slot. Height of exactly zero forces BMI to NaN
/// instead of dividing by zero.
pub fn build_features(sample: &ClinicalSample) -> FeatureVector {
    let age = nz(sample.age);
    let height = nz(sample.height);
    let weight = nz(sample.weight);
    let ap_hi = nz(sample.ap_hi);
    let ap_lo = nz(sample.ap_lo);
    let cholesterol = nz(sample.cholesterol);
    let gluc = nz(sample.gluc);
    let smoke = nz(sample.smoke);
    let alco = nz(sample.alco);
    let active = nz(sample.active);
    let gender = nz(sample.gender);

    // floor(days / 365), the training-time definition. Not calendar-aware.
    let age_years = if age.is_nan() {
        f64::NAN
    } else {
        (age / 365.0).floor()
    };

    let bmi = if height.is_nan() || weight.is_nan() || height == 0.0 {
        f64::NAN
    } else {
        weight / (height / 100.0).powi(2)
    };

    let bp_diff = if ap_hi.is_nan() || ap_lo.is_nan() {
        f64::NAN
    } else {
        ap_hi - ap_lo
    };

    // 1 = female → 0, 2 = male → 1; anything else (including missing) → NaN.
    // The raw gender slot keeps its original value either way.
    let gender_bin = match gender {
        g if g == 1.0 => 0.0,
        g if g == 2.0 => 1.0,
        _ => f64::NAN,
    };

    FeatureVector([
        age,
        height,
        weight,
        ap_hi,
        ap_lo,
        age_years,
        bmi,
        bp_diff,
        gender,
        cholesterol,
        gluc,
        smoke,
        alco,
        active,
        gender_bin,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardio_core::constants::FEATURE_COUNT;
    use proptest::prelude::*;

    fn full_sample() -> ClinicalSample {
        ClinicalSample {
            age: Some(20075.0),
            height: Some(170.0),
            weight: Some(70.0),
            ap_hi: Some(140.0),
            ap_lo: Some(90.0),
            cholesterol: Some(2.0),
            gluc: Some(1.0),
            smoke: Some(0.0),
            alco: Some(0.0),
            active: Some(1.0),
            gender: Some(2.0),
        }
    }

    #[test]
    fn derived_slots_match_formulas() {
        let v = build_features(&full_sample());
        assert_eq!(v.get("age_years"), Some(55.0));
        let bmi = v.get("bmi").unwrap();
        assert!((bmi - 70.0 / (1.7_f64).powi(2)).abs() < 1e-12);
        assert_eq!(v.get("bp_diff"), Some(50.0));
        assert_eq!(v.get("gender_bin"), Some(1.0));
    }

    #[test]
    fn output_has_fifteen_slots() {
        let v = build_features(&full_sample());
        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn missing_age_propagates_only_into_age_years() {
        let mut s = full_sample();
        s.age = None;
        let v = build_features(&s);
        assert!(v.get("age").unwrap().is_nan());
        assert!(v.get("age_years").unwrap().is_nan());
        assert!(!v.get("bmi").unwrap().is_nan());
        assert!(!v.get("bp_diff").unwrap().is_nan());
    }

    #[test]
    fn missing_height_kills_bmi_but_not_bp_diff() {
        let mut s = full_sample();
        s.height = None;
        let v = build_features(&s);
        assert!(v.get("bmi").unwrap().is_nan());
        assert!(!v.get("bp_diff").unwrap().is_nan());
    }

    #[test]
    fn zero_height_forces_bmi_nan() {
        let mut s = full_sample();
        s.height = Some(0.0);
        let v = build_features(&s);
        assert!(v.get("bmi").unwrap().is_nan());
    }

    #[test]
    fn missing_ap_lo_kills_bp_diff() {
        let mut s = full_sample();
        s.ap_lo = None;
        let v = build_features(&s);
        assert!(v.get("bp_diff").unwrap().is_nan());
        assert!(v.get("ap_lo").unwrap().is_nan());
        assert_eq!(v.get("ap_hi"), Some(140.0));
    }

    #[test]
    fn gender_one_encodes_zero() {
        let mut s = full_sample();
        s.gender = Some(1.0);
        let v = build_features(&s);
        assert_eq!(v.get("gender"), Some(1.0));
        assert_eq!(v.get("gender_bin"), Some(0.0));
    }

    #[test]
    fn unknown_gender_encodes_nan_but_raw_slot_kept() {
        let mut s = full_sample();
        s.gender = Some(3.0);
        let v = build_features(&s);
        assert_eq!(v.get("gender"), Some(3.0));
        assert!(v.get("gender_bin").unwrap().is_nan());
    }

    #[test]
    fn empty_sample_is_all_nan() {
        let v = build_features(&ClinicalSample::default());
        assert!(v.as_slice().iter().all(|x| x.is_nan()));
    }

    #[test]
    fn age_years_floors() {
        let s = ClinicalSample {
            age: Some(729.0), // 1.997 years
            ..Default::default()
        };
        assert_eq!(build_features(&s).get("age_years"), Some(1.0));
    }

    proptest! {
        #[test]
        fn always_fifteen_slots_and_deterministic(
            age in proptest::option::of(0.0..40000.0f64),
            height in proptest::option::of(0.0..250.0f64),
            weight in proptest::option::of(1.0..300.0f64),
        ) {
            let s = ClinicalSample { age, height, weight, ..Default::default() };
            let a = build_features(&s);
            let b = build_features(&s);
            prop_assert_eq!(a.as_slice().len(), FEATURE_COUNT);
            // NaN != NaN, so compare bit patterns for determinism.
            for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
                prop_assert_eq!(x.to_bits(), y.to_bits());
            }
        }

        #[test]
        fn bmi_present_iff_dependencies_present_and_height_nonzero(
            height in proptest::option::of(0.0..250.0f64),
            weight in proptest::option::of(1.0..300.0f64),
        ) {
            let s = ClinicalSample { height, weight, ..Default::default() };
            let v = build_features(&s);
            let expect_present =
                matches!((height, weight), (Some(h), Some(_)) if h != 0.0);
            prop_assert_eq!(!v.get("bmi").unwrap().is_nan(), expect_present);
        }
    }
}
