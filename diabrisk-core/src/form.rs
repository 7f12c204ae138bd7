//! Patient risk form: raw submitted values, bounds checking and the schema a
//! presentation layer needs to render the form.

use diabrisk_ml::{EncodingError, Gender, PatientInput, SmokingStatus};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const AGE: RangeInclusive<i64> = 20..=90;
pub const WEIGHT_KG: RangeInclusive<i64> = 30..=150;
pub const HEIGHT_CM: RangeInclusive<i64> = 100..=250;
pub const ACTIVITY_MINUTES: RangeInclusive<i64> = 0..=1000;
pub const GLUCOSE_FASTING: RangeInclusive<i64> = 50..=400;
pub const CHOLESTEROL_TOTAL: RangeInclusive<i64> = 100..=400;

/// Form values as submitted, before any checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub age: i64,
    pub gender: String,
    pub weight_kg: i64,
    pub height_cm: i64,
    pub smoking_status: String,
    pub activity_minutes_per_week: i64,
    #[serde(deserialize_with = "yes_no")]
    pub family_history_diabetes: bool,
    #[serde(deserialize_with = "yes_no")]
    pub hypertension_history: bool,
    pub glucose_fasting_mgdl: i64,
    pub cholesterol_total_mgdl: i64,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            age: 45,
            gender: Gender::Male.canonical().to_string(),
            weight_kg: 70,
            height_cm: 170,
            smoking_status: SmokingStatus::Never.display_label().to_string(),
            activity_minutes_per_week: 150,
            family_history_diabetes: false,
            hypertension_history: false,
            glucose_fasting_mgdl: 100,
            cholesterol_total_mgdl: 180,
        }
    }
}

/// Accepts a JSON boolean or the form's "Yes"/"No" select values.
fn yes_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "ya" | "true" => Ok(true),
            "no" | "tidak" | "false" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected Yes or No, got '{other}'"
            ))),
        },
    }
}

/// One numeric field outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be between {} and {} (got {})",
            self.field, self.min, self.max, self.value
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("invalid form: {}", join_violations(.0))]
    Invalid(Vec<FieldViolation>),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Invalid(v) => v,
            Self::Encoding(_) => &[],
        }
    }
}

fn check(
    violations: &mut Vec<FieldViolation>,
    field: &'static str,
    value: i64,
    range: RangeInclusive<i64>,
) -> u32 {
    if !range.contains(&value) {
        violations.push(FieldViolation {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }
    // Out-of-range values are never returned: the caller bails on violations.
    u32::try_from(value).unwrap_or_default()
}

impl PatientForm {
    /// Check bounds and normalize labels.
    ///
    /// All out-of-range fields are reported together. Category labels are
    /// checked only when the numeric fields pass.
    pub fn validate(&self) -> Result<PatientInput, FormError> {
        let mut violations = Vec::new();
        let age = check(&mut violations, "age", self.age, AGE);
        let weight_kg = check(&mut violations, "weight_kg", self.weight_kg, WEIGHT_KG);
        let height_cm = check(&mut violations, "height_cm", self.height_cm, HEIGHT_CM);
        let activity_minutes_per_week = check(
            &mut violations,
            "activity_minutes_per_week",
            self.activity_minutes_per_week,
            ACTIVITY_MINUTES,
        );
        let glucose_fasting_mgdl = check(
            &mut violations,
            "glucose_fasting_mgdl",
            self.glucose_fasting_mgdl,
            GLUCOSE_FASTING,
        );
        let cholesterol_total_mgdl = check(
            &mut violations,
            "cholesterol_total_mgdl",
            self.cholesterol_total_mgdl,
            CHOLESTEROL_TOTAL,
        );
        if !violations.is_empty() {
            return Err(FormError::Invalid(violations));
        }

        Ok(PatientInput {
            age,
            gender: Gender::from_label(&self.gender)?,
            weight_kg,
            height_cm,
            smoking_status: SmokingStatus::from_label(&self.smoking_status)?,
            activity_minutes_per_week,
            family_history_diabetes: self.family_history_diabetes,
            hypertension_history: self.hypertension_history,
            glucose_fasting_mgdl,
            cholesterol_total_mgdl,
        })
    }
}

/// A numeric input on the form.
#[derive(Debug, Clone, Serialize)]
pub struct NumericField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

/// A select input on the form.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<ChoiceOption>,
    pub default: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOption {
    /// Shown to the user.
    pub label: String,
    /// Submitted back.
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub numeric: Vec<NumericField>,
    pub choices: Vec<ChoiceField>,
}

fn yes_no_choice(name: &'static str, label: &'static str) -> ChoiceField {
    ChoiceField {
        name,
        label,
        options: ["No", "Yes"]
            .into_iter()
            .map(|o| ChoiceOption {
                label: o.to_string(),
                value: o.to_string(),
            })
            .collect(),
        default: "No".to_string(),
    }
}

/// Defaults, domains and selectable labels of the patient form.
pub fn form_schema() -> FormSchema {
    let d = PatientForm::default();
    let numeric = |name, label, range: RangeInclusive<i64>, default| NumericField {
        name,
        label,
        min: *range.start(),
        max: *range.end(),
        default,
    };

    FormSchema {
        numeric: vec![
            numeric("age", "Age (years)", AGE, d.age),
            numeric("weight_kg", "Weight (kg)", WEIGHT_KG, d.weight_kg),
            numeric("height_cm", "Height (cm)", HEIGHT_CM, d.height_cm),
            numeric(
                "activity_minutes_per_week",
                "Physical activity (minutes/week)",
                ACTIVITY_MINUTES,
                d.activity_minutes_per_week,
            ),
            numeric(
                "glucose_fasting_mgdl",
                "Fasting glucose (mg/dL)",
                GLUCOSE_FASTING,
                d.glucose_fasting_mgdl,
            ),
            numeric(
                "cholesterol_total_mgdl",
                "Total cholesterol (mg/dL)",
                CHOLESTEROL_TOTAL,
                d.cholesterol_total_mgdl,
            ),
        ],
        choices: vec![
            ChoiceField {
                name: "gender",
                label: "Gender",
                options: Gender::ALL
                    .iter()
                    .map(|g| ChoiceOption {
                        label: g.canonical().to_string(),
                        value: g.canonical().to_string(),
                    })
                    .collect(),
                default: d.gender,
            },
            ChoiceField {
                name: "smoking_status",
                label: "Smoking status",
                options: SmokingStatus::ALL
                    .iter()
                    .map(|s| ChoiceOption {
                        label: s.display_label().to_string(),
                        value: s.display_label().to_string(),
                    })
                    .collect(),
                default: d.smoking_status,
            },
            yes_no_choice("family_history_diabetes", "Family history of diabetes"),
            yes_no_choice("hypertension_history", "History of hypertension"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_form_is_valid() {
        let input = PatientForm::default().validate().unwrap();
        assert_eq!(input.age, 45);
        assert_eq!(input.gender, Gender::Male);
        assert_eq!(input.smoking_status, SmokingStatus::Never);
        assert!((input.bmi().unwrap() - 24.22).abs() < 0.01);
    }

    #[test]
    fn test_age_bounds() {
        for age in [20, 90] {
            let form = PatientForm {
                age,
                ..Default::default()
            };
            assert!(form.validate().is_ok(), "age {age} should be accepted");
        }
        for age in [19, 91] {
            let form = PatientForm {
                age,
                ..Default::default()
            };
            let err = form.validate().unwrap_err();
            assert_eq!(
                err.violations(),
                &[FieldViolation {
                    field: "age",
                    value: age,
                    min: 20,
                    max: 90,
                }]
            );
        }
    }

    #[test]
    fn test_collects_all_violations() {
        let form = PatientForm {
            weight_kg: 10,
            height_cm: 300,
            glucose_fasting_mgdl: -5,
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["weight_kg", "height_cm", "glucose_fasting_mgdl"]);
        assert!(err.to_string().contains("height_cm must be between 100 and 250"));
    }

    #[test]
    fn test_unknown_smoking_label() {
        let form = PatientForm {
            smoking_status: "Occasionally".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err,
            FormError::Encoding(EncodingError::unknown_category(
                "smoking_status",
                "Occasionally"
            ))
        );
    }

    #[test]
    fn test_canonical_smoking_label_accepted() {
        let form = PatientForm {
            smoking_status: "Former".into(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap().smoking_status, SmokingStatus::Former);
    }

    #[test]
    fn test_yes_no_deserialization() {
        let body = serde_json::json!({
            "age": 50, "gender": "Female", "weight_kg": 80, "height_cm": 160,
            "smoking_status": "Perokok", "activity_minutes_per_week": 30,
            "family_history_diabetes": "Yes", "hypertension_history": false,
            "glucose_fasting_mgdl": 130, "cholesterol_total_mgdl": 220
        });
        let form: PatientForm = serde_json::from_value(body).unwrap();
        assert!(form.family_history_diabetes);
        assert!(!form.hypertension_history);

        let bad = serde_json::json!({
            "age": 50, "gender": "Female", "weight_kg": 80, "height_cm": 160,
            "smoking_status": "Perokok", "activity_minutes_per_week": 30,
            "family_history_diabetes": "maybe", "hypertension_history": false,
            "glucose_fasting_mgdl": 130, "cholesterol_total_mgdl": 220
        });
        assert!(serde_json::from_value::<PatientForm>(bad).is_err());
    }

    #[test]
    fn test_schema_defaults_match_form() {
        let schema = form_schema();
        let age = schema.numeric.iter().find(|f| f.name == "age").unwrap();
        assert_eq!((age.min, age.max, age.default), (20, 90, 45));
        let smoking = schema
            .choices
            .iter()
            .find(|c| c.name == "smoking_status")
            .unwrap();
        assert_eq!(smoking.options.len(), 3);
        assert_eq!(smoking.default, "Tidak Pernah Merokok");
    }
}
