//! Process-wide state, built once before anything serves requests.

use crate::config::DiabriskConfig;
use crate::error::CoreError;
use crate::form::PatientForm;
use chrono::{DateTime, Utc};
use diabrisk_ml::inference::Verdict;
use diabrisk_ml::{ArtifactState, CsvSource, DatasetState, ModelArtifact, RiskLabel, assess};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub type SharedContext = Arc<AppContext>;

/// Loaded artifact and dataset plus the configuration they came from.
#[derive(Debug)]
pub struct AppContext {
    config: DiabriskConfig,
    artifact: ArtifactState,
    dataset: DatasetState,
    started_at: DateTime<Utc>,
}

/// What a prediction returns to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOutcome {
    pub request_id: Uuid,
    pub model_name: String,
    pub label: RiskLabel,
    pub confidence_percent: f64,
    pub bmi: f64,
    pub verdict: Verdict,
}

impl AppContext {
    /// Load the artifact and dataset named by `config`.
    ///
    /// Missing or unreadable files leave the matching state `Absent` or
    /// `Corrupt`; initialization itself never fails.
    pub fn initialize(config: DiabriskConfig) -> Self {
        let artifact = diabrisk_ml::load_artifact(&config.artifact.path);
        let dataset = CsvSource::new(&config.dataset.path)
            .with_delimiter(config.dataset.delimiter)
            .load();
        tracing::info!(
            artifact = ?artifact.status(),
            dataset = ?dataset.status(),
            "Application context initialized"
        );
        Self::from_parts(config, artifact, dataset)
    }

    pub fn from_parts(config: DiabriskConfig, artifact: ArtifactState, dataset: DatasetState) -> Self {
        Self {
            config,
            artifact,
            dataset,
            started_at: Utc::now(),
        }
    }

    pub fn shared(self) -> SharedContext {
        Arc::new(self)
    }

    pub fn config(&self) -> &DiabriskConfig {
        &self.config
    }

    pub fn artifact(&self) -> &ArtifactState {
        &self.artifact
    }

    pub fn dataset(&self) -> &DatasetState {
        &self.dataset
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// The artifact, or why prediction is disabled.
    pub fn require_artifact(&self) -> Result<&ModelArtifact, CoreError> {
        self.artifact.artifact().map(|a| a.as_ref()).ok_or_else(|| {
            CoreError::Unavailable(
                self.artifact
                    .warning()
                    .unwrap_or_else(|| "model artifact unavailable".to_string()),
            )
        })
    }

    /// Validate the form and run it through the model.
    pub fn predict(&self, form: &PatientForm) -> Result<PredictionOutcome, CoreError> {
        let request_id = Uuid::new_v4();
        let artifact = self.require_artifact()?;

        let input = form.validate().inspect_err(|e| {
            tracing::warn!(%request_id, error = %e, "Rejected patient form");
        })?;

        let assessment = assess(&input, artifact).inspect_err(|e| {
            tracing::warn!(%request_id, error = %e, "Prediction failed");
        })?;

        tracing::info!(
            %request_id,
            label = %assessment.result.label,
            confidence = assessment.result.confidence_percent,
            "Prediction completed"
        );

        Ok(PredictionOutcome {
            request_id,
            model_name: artifact.model_name.clone(),
            label: assessment.result.label,
            confidence_percent: assessment.result.confidence_percent,
            bmi: assessment.bmi,
            verdict: assessment.result.label.verdict(),
        })
    }
}
