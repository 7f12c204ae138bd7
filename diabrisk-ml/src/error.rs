//! Error types for the diabrisk-ml crate.
//!
//! Absence of a persisted file is not an error here: the stores report it as a
//! state. Everything below is either a load failure (artifact or dataset present
//! but unusable) or a contract error raised by a caller handing the pipeline
//! something it cannot process.

use thiserror::Error;

/// Top-level error type for ML operations.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl MlError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Whether this error was caused by the caller's input rather than by
    /// persisted state.
    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::Inference(_))
    }
}

/// Failure while turning raw patient attributes into a feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unrecognized input value '{value}' for {field}")]
    UnknownCategory { field: String, value: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EncodingError {
    pub fn unknown_category(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Failure while scaling or classifying a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("shape mismatch in {stage}: expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("model produced invalid output: {0}")]
    InvalidOutput(String),
}

impl InferenceError {
    pub fn shape(stage: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            stage,
            expected,
            actual,
        }
    }
}
