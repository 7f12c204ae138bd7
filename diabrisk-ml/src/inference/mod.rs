//! Inference pipeline over a loaded artifact.

pub mod pipeline;

pub use pipeline::{Assessment, PredictionResult, RiskLabel, Verdict, assess, predict};
