//! The persisted model artifact: fitted model plus its preprocessing objects.

pub mod store;

pub use store::{ArtifactState, LoadStatus, load_artifact};

use crate::algorithms::{Classifier, FittedModel};
use crate::error::MlError;
use crate::features::{FEATURE_NAMES, N_FEATURES};
use crate::preprocessing::{LabelEncoder, StandardScaler};
use serde::{Deserialize, Serialize};

/// Accuracy of one algorithm before and after hyperparameter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(alias = "Model")]
    pub model: String,
    #[serde(alias = "Akurasi Awal")]
    pub baseline_accuracy: f64,
    #[serde(alias = "Akurasi Tuned")]
    pub tuned_accuracy: f64,
    #[serde(default, alias = "Improvement", skip_serializing_if = "Option::is_none")]
    pub improvement: Option<f64>,
}

impl TrainingRecord {
    /// Recorded improvement, or tuned minus baseline when not recorded.
    pub fn improvement(&self) -> f64 {
        self.improvement
            .unwrap_or(self.tuned_accuracy - self.baseline_accuracy)
    }
}

/// Immutable bundle loaded once and shared read-only by every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_name: String,
    pub accuracy: f64,
    pub feature_names: Vec<String>,
    pub model: FittedModel,
    pub scaler: StandardScaler,
    #[serde(alias = "encoder_gender")]
    pub gender_encoder: LabelEncoder,
    #[serde(alias = "encoder_smoking")]
    pub smoking_encoder: LabelEncoder,
    #[serde(default, alias = "history", skip_serializing_if = "Option::is_none")]
    pub training_history: Option<Vec<TrainingRecord>>,
}

impl ModelArtifact {
    /// Parse and validate a JSON artifact.
    pub fn from_json(text: &str) -> Result<Self, MlError> {
        let artifact: Self = serde_json::from_str(text)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check that every part agrees with the fixed feature layout.
    pub fn validate(&self) -> Result<(), MlError> {
        if self.feature_names.len() != N_FEATURES
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .any(|(got, want)| got != want)
        {
            return Err(MlError::artifact(format!(
                "feature order {:?} does not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(MlError::artifact(format!(
                "accuracy {} outside [0, 1]",
                self.accuracy
            )));
        }
        self.scaler.validate(N_FEATURES)?;
        self.model.validate(N_FEATURES)?;
        self.gender_encoder.validate("gender_encoder")?;
        self.smoking_encoder.validate("smoking_encoder")?;
        Ok(())
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            model_name: self.model_name.clone(),
            accuracy: self.accuracy,
            algorithm: self.model.algorithm().to_string(),
            estimator: self.model.sklearn_class().to_string(),
            n_features: self.model.n_features(),
            feature_names: self.feature_names.clone(),
            gender_classes: self.gender_encoder.classes().to_vec(),
            smoking_classes: self.smoking_encoder.classes().to_vec(),
            training_history: self
                .training_history
                .iter()
                .flatten()
                .map(|r| TrainingRecord {
                    improvement: Some(r.improvement()),
                    ..r.clone()
                })
                .collect(),
        }
    }
}

/// Serializable description of a loaded artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub model_name: String,
    pub accuracy: f64,
    pub algorithm: String,
    pub estimator: String,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub gender_classes: Vec<String>,
    pub smoking_classes: Vec<String>,
    pub training_history: Vec<TrainingRecord>,
}
