//! Column type inference for the tabular dataset.

use serde::{Deserialize, Serialize};

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

/// Schema for a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
    pub nullable: bool,
}

/// Schema definition for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub columns: Vec<ColumnSchema>,
}

/// Parse one delimited cell into a typed JSON value.
pub fn parse_cell(raw: &str) -> serde_json::Value {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        serde_json::Value::Null
    } else if let Ok(i) = s.parse::<i64>() {
        serde_json::Value::Number(i.into())
    } else if let Ok(f) = s.parse::<f64>() {
        serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(s.to_string()))
    } else if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        serde_json::Value::Bool(s.eq_ignore_ascii_case("true"))
    } else {
        serde_json::Value::String(s.to_string())
    }
}

/// Infer column type from a sample of values.
pub fn infer_column_type(values: &[&serde_json::Value]) -> ColumnType {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;

    for v in values {
        match v {
            serde_json::Value::Number(n) => {
                if n.is_f64() {
                    has_float = true;
                } else {
                    has_int = true;
                }
            }
            serde_json::Value::Bool(_) => has_bool = true,
            serde_json::Value::String(_) => has_string = true,
            _ => {}
        }
    }

    if has_string || (has_bool && (has_int || has_float)) {
        ColumnType::String
    } else if has_float {
        ColumnType::Float
    } else if has_int {
        ColumnType::Integer
    } else if has_bool {
        ColumnType::Boolean
    } else {
        ColumnType::Null
    }
}

/// Infer schema from parsed rows.
pub fn infer_schema(columns: &[String], rows: &[Vec<serde_json::Value>]) -> SchemaDefinition {
    let columns = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let values: Vec<&serde_json::Value> = rows.iter().filter_map(|r| r.get(i)).collect();
            ColumnSchema {
                name: name.clone(),
                dtype: infer_column_type(&values),
                nullable: values.iter().any(|v| v.is_null()),
            }
        })
        .collect();
    SchemaDefinition { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("42"), serde_json::json!(42));
        assert_eq!(parse_cell(" 24.5 "), serde_json::json!(24.5));
        assert_eq!(parse_cell("\"Male\""), serde_json::json!("Male"));
        assert_eq!(parse_cell(""), serde_json::Value::Null);
        assert_eq!(parse_cell("TRUE"), serde_json::json!(true));
    }

    #[test]
    fn test_infer_mixed_numeric_is_float() {
        let a = serde_json::json!(1);
        let b = serde_json::json!(2.5);
        assert_eq!(infer_column_type(&[&a, &b]), ColumnType::Float);
    }

    #[test]
    fn test_infer_schema() {
        let columns = vec!["gender".to_string(), "age".to_string()];
        let rows = vec![
            vec![parse_cell("Female"), parse_cell("30")],
            vec![parse_cell("Male"), parse_cell("")],
        ];
        let schema = infer_schema(&columns, &rows);
        assert_eq!(schema.columns[0].dtype, ColumnType::String);
        assert_eq!(schema.columns[1].dtype, ColumnType::Integer);
        assert!(schema.columns[1].nullable);
    }
}
