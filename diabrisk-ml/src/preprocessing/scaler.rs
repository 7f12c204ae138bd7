//! Fitted standard scaler.

use crate::error::{InferenceError, MlError};
use serde::{Deserialize, Serialize};

/// Standardizes each feature with the mean and scale captured at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Scale a single sample. A zero scale leaves the centred value unscaled.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if x.len() != self.mean.len() || self.scale.len() != self.mean.len() {
            return Err(InferenceError::shape("scaler", self.mean.len(), x.len()));
        }
        Ok(x.iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((v, m), s)| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (v - m) / s
            })
            .collect())
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<(), MlError> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(MlError::artifact(format!(
                "scaler fitted on {} means / {} scales, expected {n_features}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self
            .mean
            .iter()
            .chain(&self.scale)
            .any(|v| !v.is_finite())
        {
            return Err(MlError::artifact("scaler contains non-finite statistics"));
        }
        if self.scale.iter().any(|s| *s < 0.0) {
            return Err(MlError::artifact("scaler contains a negative scale"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform_centres_and_scales() {
        let scaler = StandardScaler {
            mean: vec![2.0, 10.0],
            scale: vec![1.0, 0.0],
        };
        let out = scaler.transform(&[3.0, 12.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn test_transform_wrong_width() {
        let scaler = StandardScaler {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err, InferenceError::shape("scaler", 3, 2));
    }

    #[test]
    fn test_validate() {
        let scaler = StandardScaler {
            mean: vec![0.0; 2],
            scale: vec![1.0, f64::NAN],
        };
        assert!(scaler.validate(2).is_err());
        assert!(scaler.validate(3).is_err());
    }
}
