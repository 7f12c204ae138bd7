//! Property-based tests for the encode → predict pipeline using proptest.

use proptest::prelude::*;

use diabrisk_ml::algorithms::{FittedModel, GaussianNb, LogisticRegression};
use diabrisk_ml::features::{FEATURE_NAMES, N_FEATURES};
use diabrisk_ml::preprocessing::{LabelEncoder, StandardScaler};
use diabrisk_ml::{Gender, ModelArtifact, PatientInput, SmokingStatus, encode, predict};

fn artifact_with(model: FittedModel) -> ModelArtifact {
    ModelArtifact {
        model_name: "Gaussian Naive Bayes".into(),
        accuracy: 0.79,
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        model,
        scaler: StandardScaler {
            mean: vec![50.0, 0.5, 26.0, 110.0, 0.2, 0.25, 1.2, 120.0, 190.0],
            scale: vec![15.0, 0.5, 4.5, 25.0, 0.4, 0.43, 0.8, 80.0, 35.0],
        },
        gender_encoder: LabelEncoder::fit(["Female", "Male"]),
        smoking_encoder: LabelEncoder::fit(["Never", "Former", "Current"]),
        training_history: None,
    }
}

fn naive_bayes() -> FittedModel {
    FittedModel::GaussianNb(GaussianNb {
        class_prior: vec![0.9, 0.1],
        theta: vec![vec![-0.2; N_FEATURES], vec![0.8; N_FEATURES]],
        var: vec![vec![1.0; N_FEATURES], vec![1.5; N_FEATURES]],
    })
}

fn logistic() -> FittedModel {
    FittedModel::LogisticRegression(LogisticRegression {
        coef: vec![0.6, 0.1, 0.5, 1.4, 0.4, 0.3, 0.05, -0.3, 0.2],
        intercept: -0.4,
    })
}

fn gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

fn smoking() -> impl Strategy<Value = SmokingStatus> {
    prop_oneof![
        Just(SmokingStatus::Current),
        Just(SmokingStatus::Former),
        Just(SmokingStatus::Never),
    ]
}

prop_compose! {
    fn patient()(
        age in 20u32..=90,
        gender in gender(),
        weight_kg in 30u32..=150,
        height_cm in 100u32..=250,
        smoking_status in smoking(),
        activity_minutes_per_week in 0u32..=1000,
        family_history_diabetes in any::<bool>(),
        hypertension_history in any::<bool>(),
        glucose_fasting_mgdl in 50u32..=400,
        cholesterol_total_mgdl in 100u32..=400,
    ) -> PatientInput {
        PatientInput {
            age,
            gender,
            weight_kg,
            height_cm,
            smoking_status,
            activity_minutes_per_week,
            family_history_diabetes,
            hypertension_history,
            glucose_fasting_mgdl,
            cholesterol_total_mgdl,
        }
    }
}

proptest! {
    #[test]
    fn valid_input_encodes_to_fixed_order(input in patient()) {
        let artifact = artifact_with(logistic());
        let v = encode(&input, &artifact).unwrap();
        let s = v.as_slice();
        prop_assert_eq!(s.len(), N_FEATURES);
        prop_assert_eq!(s[0], input.age as f64);
        prop_assert_eq!(s[2], input.bmi().unwrap());
        prop_assert_eq!(s[3], input.glucose_fasting_mgdl as f64);
        prop_assert_eq!(s[4], if input.family_history_diabetes { 1.0 } else { 0.0 });
        prop_assert_eq!(s[5], if input.hypertension_history { 1.0 } else { 0.0 });
        prop_assert_eq!(s[7], input.activity_minutes_per_week as f64);
        prop_assert_eq!(s[8], input.cholesterol_total_mgdl as f64);
        prop_assert_eq!(v.bmi(), s[2]);
    }

    #[test]
    fn confidence_stays_in_percent_range(input in patient(), use_nb in any::<bool>()) {
        let artifact = artifact_with(if use_nb { naive_bayes() } else { logistic() });
        let v = encode(&input, &artifact).unwrap();
        let result = predict(&v, &artifact).unwrap();
        prop_assert!((0.0..=100.0).contains(&result.confidence_percent));
        // Binary: the predicted class never has less than half the mass.
        prop_assert!(result.confidence_percent >= 50.0 - 1e-9);
    }

    #[test]
    fn predict_is_idempotent(input in patient()) {
        let artifact = artifact_with(naive_bayes());
        let v = encode(&input, &artifact).unwrap();
        let first = predict(&v, &artifact).unwrap();
        let second = predict(&v, &artifact).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn label_encoder_round_trips(labels in prop::collection::vec("[A-Za-z]{1,8}", 1..10)) {
        let enc = LabelEncoder::fit(labels.iter().cloned());
        for label in &labels {
            let code = enc.encode(label).unwrap();
            prop_assert_eq!(enc.decode(code), Some(label.as_str()));
        }
    }
}
