//! Read-only loading of the delimited patient dataset.

use crate::data::schema::{SchemaDefinition, infer_schema, parse_cell};
use crate::error::MlError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Binary target column every usable dataset carries.
pub const TARGET_COLUMN: &str = "diagnosed_diabetes";

/// Rows used for schema inference.
const SCHEMA_SAMPLE_ROWS: usize = 100;

/// Information about where and when the dataset was read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub row_count: usize,
}

/// A batch of data rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub total_rows: usize,
}

/// Count of each target class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCounts {
    pub negative: usize,
    pub positive: usize,
    /// Rows whose target is missing or not 0/1.
    pub other: usize,
}

/// The parsed dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
    info: DataSourceInfo,
}

impl Dataset {
    /// Parse delimited text; the first non-empty line is the header.
    pub fn parse(content: &str, delimiter: char, location: &str) -> Result<Self, MlError> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());

        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| MlError::dataset("Empty dataset file"))?
            .split(delimiter)
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();
        if !columns.iter().any(|c| c == TARGET_COLUMN) {
            return Err(MlError::dataset(format!(
                "header has no '{TARGET_COLUMN}' column"
            )));
        }

        let mut rows = Vec::new();
        for (i, line) in lines.enumerate() {
            let row: Vec<serde_json::Value> = line.split(delimiter).map(parse_cell).collect();
            if row.len() != columns.len() {
                return Err(MlError::dataset(format!(
                    "row {} has {} fields, header has {}",
                    i + 1,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }

        let info = DataSourceInfo {
            location: location.to_string(),
            accessed_at: chrono::Utc::now(),
            row_count: rows.len(),
        };
        Ok(Self {
            columns,
            rows,
            info,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn info(&self) -> &DataSourceInfo {
        &self.info
    }

    /// The first `n` rows.
    pub fn preview(&self, n: usize) -> DataBatch {
        DataBatch {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }

    pub fn schema(&self) -> SchemaDefinition {
        let end = self.rows.len().min(SCHEMA_SAMPLE_ROWS);
        infer_schema(&self.columns, &self.rows[..end])
    }

    pub fn target_counts(&self) -> TargetCounts {
        let mut counts = TargetCounts::default();
        let Some(idx) = self.columns.iter().position(|c| c == TARGET_COLUMN) else {
            return counts;
        };
        for row in &self.rows {
            match row.get(idx).and_then(serde_json::Value::as_f64) {
                Some(v) if v == 0.0 => counts.negative += 1,
                Some(v) if v == 1.0 => counts.positive += 1,
                _ => counts.other += 1,
            }
        }
        counts
    }
}

/// Outcome of loading the dataset.
#[derive(Debug, Clone)]
pub enum DatasetState {
    Loaded(Arc<Dataset>),
    Absent { path: PathBuf },
    Corrupt { path: PathBuf, reason: String },
}

impl DatasetState {
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            Self::Loaded(d) => Some(d),
            _ => None,
        }
    }

    pub fn status(&self) -> crate::artifact::LoadStatus {
        use crate::artifact::LoadStatus;
        match self {
            Self::Loaded(_) => LoadStatus::Loaded,
            Self::Absent { .. } => LoadStatus::Absent,
            Self::Corrupt { .. } => LoadStatus::Corrupt,
        }
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Loaded(_) => None,
            Self::Absent { path } => Some(format!(
                "Dataset file '{}' not found. Please provide it.",
                path.display()
            )),
            Self::Corrupt { path, reason } => Some(format!(
                "Dataset file '{}' could not be read ({reason}).",
                path.display()
            )),
        }
    }
}

/// Delimited dataset on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: char,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: ',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load the dataset. Never fails: problems are reported through the state.
    pub fn load(&self) -> DatasetState {
        load_dataset(&self.path, self.delimiter)
    }
}

pub fn load_dataset(path: &Path, delimiter: char) -> DatasetState {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Dataset not found");
            return DatasetState::Absent {
                path: path.to_path_buf(),
            };
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read dataset");
            return DatasetState::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
        }
    };

    match Dataset::parse(&content, delimiter, &path.display().to_string()) {
        Ok(dataset) => {
            tracing::info!(
                path = %path.display(),
                rows = dataset.row_count(),
                columns = dataset.column_count(),
                "Loaded dataset"
            );
            DatasetState::Loaded(Arc::new(dataset))
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Dataset is corrupt");
            DatasetState::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::LoadStatus;
    use crate::data::schema::ColumnType;

    const SAMPLE: &str = "age,gender,glucose_fasting,diagnosed_diabetes\n\
                          45,Male,100,0\n\
                          61,Female,180,1\n\
                          \n\
                          33,Female,92,0\n";

    #[test]
    fn test_parse_shape_and_preview() {
        let ds = Dataset::parse(SAMPLE, ',', "memory").unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_count(), 4);
        let preview = ds.preview(2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.rows[1][1], serde_json::json!("Female"));
    }

    #[test]
    fn test_target_counts() {
        let ds = Dataset::parse(SAMPLE, ',', "memory").unwrap();
        assert_eq!(
            ds.target_counts(),
            TargetCounts {
                negative: 2,
                positive: 1,
                other: 0
            }
        );
    }

    #[test]
    fn test_schema_inference() {
        let ds = Dataset::parse(SAMPLE, ',', "memory").unwrap();
        let schema = ds.schema();
        assert_eq!(schema.columns[0].dtype, ColumnType::Integer);
        assert_eq!(schema.columns[1].dtype, ColumnType::String);
    }

    #[test]
    fn test_missing_target_column() {
        let err = Dataset::parse("age,gender\n1,Male\n", ',', "memory").unwrap_err();
        assert!(err.to_string().contains(TARGET_COLUMN));
    }

    #[test]
    fn test_ragged_row_is_error() {
        let err = Dataset::parse("a,diagnosed_diabetes\n1,0,9\n", ',', "memory").unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_load_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diabetes_dataset.csv");
        assert_eq!(CsvSource::new(&path).load().status(), LoadStatus::Absent);

        std::fs::write(&path, "").unwrap();
        assert_eq!(CsvSource::new(&path).load().status(), LoadStatus::Corrupt);

        std::fs::write(&path, SAMPLE.replace(',', ";")).unwrap();
        let state = CsvSource::new(&path).with_delimiter(';').load();
        assert_eq!(state.status(), LoadStatus::Loaded);
        assert_eq!(state.dataset().unwrap().row_count(), 3);
    }
}
