//! Request and response bodies plus the error-to-status mapping.

use crate::error::CoreError;
use crate::form::FormError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diabrisk_ml::data::{DataBatch, SchemaDefinition, TargetCounts};
use diabrisk_ml::{LoadStatus, MlError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub artifact: LoadStatus,
    pub dataset: LoadStatus,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetQuery {
    pub rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResponse {
    pub location: String,
    pub row_count: usize,
    pub column_count: usize,
    pub preview: DataBatch,
    pub schema: SchemaDefinition,
    pub target_counts: TargetCounts,
}

/// JSON error body with the status it maps to.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "unavailable", message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Unavailable(msg) => Self::unavailable(msg),
            CoreError::Form(FormError::Invalid(violations)) => Self {
                details: serde_json::to_value(&violations).ok(),
                ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_form", message)
            },
            CoreError::Form(FormError::Encoding(_)) | CoreError::Ml(MlError::Encoding(_)) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "unrecognized_input", message)
            }
            CoreError::Ml(MlError::Inference(_)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "inference_error", message)
            }
            CoreError::Ml(_) | CoreError::Config(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "invalid_body", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldViolation;
    use diabrisk_ml::{EncodingError, InferenceError};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(CoreError, StatusCode)> = vec![
            (CoreError::Unavailable("gone".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                CoreError::Form(FormError::Invalid(vec![FieldViolation {
                    field: "age",
                    value: 19,
                    min: 20,
                    max: 90,
                }])),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Ml(MlError::Encoding(EncodingError::unknown_category(
                    "gender", "X",
                ))),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Ml(MlError::Inference(InferenceError::shape("scaler", 9, 8))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_invalid_form_carries_details() {
        let err = ApiError::from(CoreError::Form(FormError::Invalid(vec![FieldViolation {
            field: "age",
            value: 91,
            min: 20,
            max: 90,
        }])));
        let details = err.details.unwrap();
        assert_eq!(details[0]["field"], "age");
        assert_eq!(details[0]["value"], 91);
    }
}
