use serde_json::Value;
use crate::errors::DaichoError::ParseError;
use crate::errors::DaichoResult;
use crate::types::dataset::Dataset;

/// Convert a fitness-tracker JSON export (an array of flat record objects)
/// into a [`Dataset`].
///
/// Columns are the union of all record keys in first-appearance order;
/// records missing a key get an empty cell there.
pub fn records_to_dataset(json_text: &str) -> DaichoResult<Dataset> {
    let export = serde_json::from_str::<Value>(json_text)
        .map_err(|e| ParseError(format!("Export is not valid JSON: {}", e)))?;
    let records = export.as_array()
        .ok_or_else(|| ParseError("Export root must be a JSON array of records".to_string()))?;
    if records.is_empty() {
        return Err(ParseError("Export contains no records".to_string()));
    }

    let mut columns: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let record = record.as_object()
            .ok_or_else(|| ParseError(format!("Record {} is not a JSON object", index)))?;
        for key in record.keys() {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.get(column).map(value_to_cell).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    Dataset::new(columns, rows)
}

/// Convenience composition of [`records_to_dataset`] and CSV serialization.
pub fn export_to_csv(json_text: &str) -> DaichoResult<String> {
    records_to_dataset(json_text)?.to_csv()
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::DaichoError;
    use super::*;

    #[test]
    fn test_records_to_dataset() {
        let export = r#"[
            {"time": "2024-05-01T07:00:00Z", "heart_rate": 92, "steps": 120},
            {"time": "2024-05-01T07:01:00Z", "heart_rate": 95, "steps": 133}
        ]"#;

        let dataset = records_to_dataset(export).unwrap();
        assert_eq!(dataset.columns(), ["heart_rate", "steps", "time"]);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.rows()[0], ["92", "120", "2024-05-01T07:00:00Z"]);
    }

    #[test]
    fn test_key_union_with_gaps() {
        let export = r#"[
            {"time": "t1", "heart_rate": 92},
            {"time": "t2", "cadence": 80}
        ]"#;

        let dataset = records_to_dataset(export).unwrap();
        assert_eq!(dataset.columns(), ["heart_rate", "time", "cadence"]);
        assert_eq!(dataset.rows()[0], ["92", "t1", ""]);
        assert_eq!(dataset.rows()[1], ["", "t2", "80"]);
    }

    #[test]
    fn test_null_and_bool_cells() {
        let export = r#"[{"paused": true, "note": null}]"#;
        let dataset = records_to_dataset(export).unwrap();
        assert_eq!(dataset.rows()[0], ["", "true"]);
    }

    #[test]
    fn test_rejects_non_array_root() {
        let result = records_to_dataset(r#"{"time": "t1"}"#);
        assert!(matches!(result, Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_rejects_non_object_record() {
        let result = records_to_dataset(r#"[1, 2, 3]"#);
        assert!(matches!(result, Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_rejects_empty_export() {
        let result = records_to_dataset("[]");
        assert!(matches!(result, Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_export_to_csv() {
        let csv = export_to_csv(r#"[{"a": 1, "b": "x"}]"#).unwrap();
        assert_eq!(csv, "a,b\n1,x\n");
    }
}
