//! Fixed-order feature vector assembly.

use crate::artifact::ModelArtifact;
use crate::error::{EncodingError, InferenceError};
use crate::features::patient::PatientInput;
use serde::{Deserialize, Serialize};

/// Number of features the model consumes.
pub const N_FEATURES: usize = 9;

/// Column order the scaler and model were fitted on. Reordering silently
/// corrupts predictions.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "gender",
    "bmi",
    "glucose_fasting",
    "family_history_diabetes",
    "hypertension_history",
    "smoking_status",
    "physical_activity_minutes_per_week",
    "cholesterol_total",
];

const BMI_INDEX: usize = 2;

/// Raw (unscaled) numeric features in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The BMI carried in the vector; the single source for display.
    pub fn bmi(&self) -> f64 {
        self.0[BMI_INDEX]
    }

    /// Feature name / value pairs, for logs and API responses.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = InferenceError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; N_FEATURES] = values
            .try_into()
            .map_err(|_| InferenceError::shape("feature vector", N_FEATURES, values.len()))?;
        Ok(Self(array))
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Encode a patient into the model's feature vector.
///
/// Categorical codes come from the artifact's fitted encoders, never from a
/// hardcoded table. BMI is computed here once.
pub fn encode(input: &PatientInput, artifact: &ModelArtifact) -> Result<FeatureVector, EncodingError> {
    let gender_code = artifact
        .gender_encoder
        .transform("gender", input.gender.canonical())?;
    let smoking_code = artifact
        .smoking_encoder
        .transform("smoking_status", input.smoking_status.canonical())?;
    let bmi = input.bmi()?;

    Ok(FeatureVector([
        input.age as f64,
        gender_code as f64,
        bmi,
        input.glucose_fasting_mgdl as f64,
        flag(input.family_history_diabetes),
        flag(input.hypertension_history),
        smoking_code as f64,
        input.activity_minutes_per_week as f64,
        input.cholesterol_total_mgdl as f64,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::tests::sample_artifact;
    use crate::features::patient::{Gender, SmokingStatus};
    use crate::preprocessing::LabelEncoder;

    fn reference_input() -> PatientInput {
        PatientInput {
            age: 45,
            gender: Gender::Male,
            weight_kg: 70,
            height_cm: 170,
            smoking_status: SmokingStatus::Never,
            activity_minutes_per_week: 150,
            family_history_diabetes: false,
            hypertension_history: false,
            glucose_fasting_mgdl: 100,
            cholesterol_total_mgdl: 180,
        }
    }

    #[test]
    fn test_reference_vector_order() {
        let artifact = sample_artifact();
        let v = encode(&reference_input(), &artifact).unwrap();
        let s = v.as_slice();
        assert_eq!(s.len(), N_FEATURES);
        assert_eq!(s[0], 45.0);
        // sorted classes: Female=0, Male=1
        assert_eq!(s[1], 1.0);
        assert!((s[2] - 24.22).abs() < 0.01);
        assert_eq!(s[3], 100.0);
        assert_eq!(s[4], 0.0);
        assert_eq!(s[5], 0.0);
        // sorted classes: Current=0, Former=1, Never=2
        assert_eq!(s[6], 2.0);
        assert_eq!(s[7], 150.0);
        assert_eq!(s[8], 180.0);
        assert_eq!(v.bmi(), s[2]);
    }

    #[test]
    fn test_flags_encode_as_one() {
        let artifact = sample_artifact();
        let input = PatientInput {
            family_history_diabetes: true,
            hypertension_history: true,
            ..reference_input()
        };
        let v = encode(&input, &artifact).unwrap();
        assert_eq!(&v.as_slice()[4..6], &[1.0, 1.0]);
    }

    #[test]
    fn test_encoder_label_set_is_authoritative() {
        let mut artifact = sample_artifact();
        artifact.gender_encoder = LabelEncoder::from_classes(["F", "M"]);
        let err = encode(&reference_input(), &artifact).unwrap_err();
        assert_eq!(err, EncodingError::unknown_category("gender", "Male"));
    }

    #[test]
    fn test_zero_height_is_invalid_input() {
        let artifact = sample_artifact();
        let input = PatientInput {
            height_cm: 0,
            ..reference_input()
        };
        assert!(matches!(
            encode(&input, &artifact),
            Err(EncodingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_try_from_wrong_length() {
        let err = FeatureVector::try_from(&[1.0, 2.0][..]).unwrap_err();
        assert_eq!(err, InferenceError::shape("feature vector", 9, 2));
    }

    #[test]
    fn test_named_pairs_follow_order() {
        let v = FeatureVector::try_from(&[0.0; 9][..]).unwrap();
        let names: Vec<_> = v.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_NAMES);
    }
}
