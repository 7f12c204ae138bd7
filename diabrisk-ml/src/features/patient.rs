//! Patient attributes as entered on the risk form.

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};

/// Patient gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// The label the gender encoder is expected to have been fitted on.
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Parse a submitted label, case-insensitively.
    pub fn from_label(label: &str) -> Result<Self, EncodingError> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.canonical().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| EncodingError::unknown_category("gender", label))
    }
}

/// Smoking status, canonical values as used during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    Current,
    Former,
    Never,
}

impl SmokingStatus {
    pub const ALL: [SmokingStatus; 3] = [
        SmokingStatus::Current,
        SmokingStatus::Former,
        SmokingStatus::Never,
    ];

    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Former => "Former",
            Self::Never => "Never",
        }
    }

    /// The label shown on the form.
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Current => "Perokok",
            Self::Former => "Sudah Berhenti Merokok",
            Self::Never => "Tidak Pernah Merokok",
        }
    }

    /// Normalize either a form label or a canonical value.
    pub fn from_label(label: &str) -> Result<Self, EncodingError> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| {
                s.display_label().eq_ignore_ascii_case(trimmed)
                    || s.canonical().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| EncodingError::unknown_category("smoking_status", label))
    }
}

/// One inference request, already within the form's numeric domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: u32,
    pub height_cm: u32,
    pub smoking_status: SmokingStatus,
    pub activity_minutes_per_week: u32,
    pub family_history_diabetes: bool,
    pub hypertension_history: bool,
    pub glucose_fasting_mgdl: u32,
    pub cholesterol_total_mgdl: u32,
}

impl PatientInput {
    pub fn bmi(&self) -> Result<f64, EncodingError> {
        body_mass_index(self.weight_kg as f64, self.height_cm as f64)
    }
}

/// Weight in kilograms over height in metres squared.
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> Result<f64, EncodingError> {
    if !(height_cm > 0.0) {
        return Err(EncodingError::InvalidInput(format!(
            "height must be positive, got {height_cm} cm"
        )));
    }
    if !(weight_kg >= 0.0) {
        return Err(EncodingError::InvalidInput(format!(
            "weight must not be negative, got {weight_kg} kg"
        )));
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}
