//! # Diabrisk Core
//!
//! Service layer for diabrisk: layered configuration, the patient form,
//! the application context holding the loaded artifact and dataset, and the
//! HTTP gateway that exposes them.

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod gateway;

// Re-export commonly used types at the crate root.
pub use config::{ConfigOverrides, DiabriskConfig, config_exists, load_config};
pub use context::{AppContext, PredictionOutcome, SharedContext};
pub use error::CoreError;
pub use form::{FieldViolation, FormError, FormSchema, PatientForm, form_schema};
