//! Error types for diabrisk-core.

use crate::form::FormError;
use diabrisk_ml::MlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A persisted resource the operation needs is absent or corrupt.
    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Ml(#[from] MlError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Caused by the submitted form rather than by server state.
    pub fn is_form(&self) -> bool {
        matches!(self, Self::Form(_) | Self::Ml(MlError::Encoding(_)))
    }
}

impl From<Box<figment::Error>> for CoreError {
    fn from(e: Box<figment::Error>) -> Self {
        Self::Config(e.to_string())
    }
}
