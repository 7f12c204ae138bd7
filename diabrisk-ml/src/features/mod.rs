//! Patient attributes and their encoding into model features.

pub mod patient;
pub mod vector;

pub use patient::{Gender, PatientInput, SmokingStatus, body_mass_index};
pub use vector::{FEATURE_NAMES, FeatureVector, N_FEATURES, encode};
