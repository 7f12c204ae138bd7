//! Fitted label encoder.

use crate::error::{EncodingError, MlError};
use serde::{Deserialize, Serialize};

/// Maps a fixed set of categorical labels to integer codes.
///
/// The code of a label is its position in `classes`. Fitting sorts the labels,
/// so codes agree with an encoder fitted on the same data at training time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from already-ordered classes, as persisted.
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Fit on observed labels: sorted, deduplicated.
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Encode `label` for the named input field.
    pub fn transform(&self, field: &str, label: &str) -> Result<usize, EncodingError> {
        self.encode(label)
            .ok_or_else(|| EncodingError::unknown_category(field, label))
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), MlError> {
        if self.classes.is_empty() {
            return Err(MlError::artifact(format!("{name} has no classes")));
        }
        let mut seen = std::collections::HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.as_str()) {
                return Err(MlError::artifact(format!(
                    "{name} lists class '{class}' more than once"
                )));
            }
        }
        Ok(())
    }
}
