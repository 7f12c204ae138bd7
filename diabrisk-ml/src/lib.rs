//! # diabrisk-ml: artifact loading, feature encoding and inference
//!
//! This crate holds the sequential core of diabrisk: a typed model artifact
//! loaded once from disk, the encoder that turns patient attributes into the
//! nine-feature vector the model was trained on, and the pipeline that scales
//! that vector, classifies it and interprets the result.
//!
//! ```text
//! PatientInput ─encode─▶ FeatureVector ─scale─▶ model ─interpret─▶ PredictionResult
//! ```
//!
//! Absence of persisted files is a state, not an error: see
//! [`ArtifactState`] and [`DatasetState`].

pub mod algorithms;
pub mod artifact;
pub mod data;
pub mod error;
pub mod features;
pub mod inference;
pub mod preprocessing;

// Re-exports
pub use artifact::{ArtifactState, ArtifactSummary, LoadStatus, ModelArtifact, load_artifact};
pub use data::{CsvSource, Dataset, DatasetState};
pub use error::{EncodingError, InferenceError, MlError};
pub use features::{FeatureVector, Gender, PatientInput, SmokingStatus, encode};
pub use inference::{Assessment, PredictionResult, RiskLabel, assess, predict};
