//! Tabular dataset loading.

pub mod schema;
pub mod source;

pub use schema::{ColumnSchema, ColumnType, SchemaDefinition};
pub use source::{
    CsvSource, DataBatch, DataSourceInfo, Dataset, DatasetState, TARGET_COLUMN, TargetCounts,
    load_dataset,
};
