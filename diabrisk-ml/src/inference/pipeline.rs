//! Scale → classify → interpret for one feature vector.

use crate::algorithms::Classifier;
use crate::artifact::ModelArtifact;
use crate::error::{InferenceError, MlError};
use crate::features::{FeatureVector, PatientInput, encode};
use serde::{Deserialize, Serialize};

/// Binary risk outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Positive,
    Negative,
}

impl RiskLabel {
    /// Class index 1 is the diagnosed-diabetes class.
    pub fn from_class(class: usize) -> Result<Self, InferenceError> {
        match class {
            0 => Ok(Self::Negative),
            1 => Ok(Self::Positive),
            other => Err(InferenceError::InvalidOutput(format!(
                "class index {other} is not binary"
            ))),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Positive => Verdict {
                headline: "POSITIVE (at risk)",
                message: "The system detected a pattern similar to diabetic patients.",
                advice: "Consult a doctor soon and manage your diet.",
            },
            Self::Negative => Verdict {
                headline: "NEGATIVE (healthy)",
                message: "The system did not detect a significant diabetes risk.",
                advice: "Keep a healthy lifestyle and exercise regularly.",
            },
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "POSITIVE"),
            Self::Negative => write!(f, "NEGATIVE"),
        }
    }
}

/// Human-readable guidance for a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub headline: &'static str,
    pub message: &'static str,
    pub advice: &'static str,
}

/// Predicted label and the probability of that label as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: RiskLabel,
    pub confidence_percent: f64,
}

/// Run the fitted scaler and model over a raw feature vector.
///
/// Stateless: the same vector and artifact always give the same result.
/// Confidence is the probability of the predicted class, which is not
/// necessarily the largest one when probabilities tie.
pub fn predict(
    vector: &FeatureVector,
    artifact: &ModelArtifact,
) -> Result<PredictionResult, InferenceError> {
    let scaled = artifact.scaler.transform(vector.as_slice())?;
    let (class, proba) = artifact.model.classify(&scaled)?;

    let p = *proba.get(class).ok_or_else(|| {
        InferenceError::InvalidOutput(format!(
            "predicted class {class} has no probability in {proba:?}"
        ))
    })?;
    let label = RiskLabel::from_class(class)?;

    Ok(PredictionResult {
        label,
        confidence_percent: p * 100.0,
    })
}

/// Everything produced for one patient: the vector, its BMI and the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub vector: FeatureVector,
    pub bmi: f64,
    pub result: PredictionResult,
}

/// Encode a patient and predict. Encoding failures stop before inference.
pub fn assess(input: &PatientInput, artifact: &ModelArtifact) -> Result<Assessment, MlError> {
    let vector = encode(input, artifact)?;
    tracing::trace!(features = ?vector.named().collect::<Vec<_>>(), "Encoded patient");
    let result = predict(&vector, artifact)?;
    tracing::debug!(
        label = %result.label,
        confidence = result.confidence_percent,
        bmi = vector.bmi(),
        "Assessed patient"
    );
    Ok(Assessment {
        bmi: vector.bmi(),
        vector,
        result,
    })
}
