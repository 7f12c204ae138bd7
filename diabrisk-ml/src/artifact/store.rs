//! Loading the persisted artifact into a typed state.

use crate::artifact::ModelArtifact;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of loading the model artifact.
///
/// `Absent` is an expected state (nothing has been trained yet); `Corrupt`
/// means a file exists but cannot be used. Neither stops the process.
#[derive(Debug, Clone)]
pub enum ArtifactState {
    Loaded(Arc<ModelArtifact>),
    Absent { path: PathBuf },
    Corrupt { path: PathBuf, reason: String },
}

/// Short status label for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    Absent,
    Corrupt,
}

impl ArtifactState {
    pub fn artifact(&self) -> Option<&Arc<ModelArtifact>> {
        match self {
            Self::Loaded(a) => Some(a),
            _ => None,
        }
    }

    pub fn status(&self) -> LoadStatus {
        match self {
            Self::Loaded(_) => LoadStatus::Loaded,
            Self::Absent { .. } => LoadStatus::Absent,
            Self::Corrupt { .. } => LoadStatus::Corrupt,
        }
    }

    /// User-facing warning when prediction must be disabled.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Loaded(_) => None,
            Self::Absent { path } => Some(format!(
                "Model file '{}' not found; prediction is disabled until a trained model is provided.",
                path.display()
            )),
            Self::Corrupt { path, reason } => Some(format!(
                "Model file '{}' could not be used ({reason}); prediction is disabled.",
                path.display()
            )),
        }
    }
}

/// Read and validate the artifact at `path`. Never fails: every problem is
/// reported through the returned state.
pub fn load_artifact(path: &Path) -> ArtifactState {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Model artifact not found");
            return ArtifactState::Absent {
                path: path.to_path_buf(),
            };
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read model artifact");
            return ArtifactState::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
        }
    };

    match ModelArtifact::from_json(&text) {
        Ok(artifact) => {
            tracing::info!(
                path = %path.display(),
                model = %artifact.model_name,
                algorithm = artifact.model.algorithm(),
                accuracy = artifact.accuracy,
                "Loaded model artifact"
            );
            ArtifactState::Loaded(Arc::new(artifact))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Model artifact is corrupt");
            ArtifactState::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
