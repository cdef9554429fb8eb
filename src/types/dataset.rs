use csv::{ReaderBuilder, Writer};
use crate::errors::DaichoError::{InvalidArgumentError, ParseError};
use crate::errors::DaichoResult;

/// In-memory table of named columns and ordered rows, parsed from CSV text.
///
/// Every row is exactly as wide as the header. The struct owns its cells as
/// plain strings; typing the values is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> DaichoResult<Self> {
        for (index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ParseError(
                    format!("Row {} has {} fields but the header has {}",
                            index, row.len(), columns.len())));
            }
        }

        Ok(Self { columns, rows })
    }

    /// Parse delimited text: header row = column names, one data row per line.
    pub fn from_csv(text: &str) -> DaichoResult<Self> {
        if text.trim().is_empty() {
            return Err(ParseError("Content is empty".to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let columns = reader.headers()
            .map_err(|e| ParseError(format!("Malformed header row: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| ParseError(format!("Malformed record: {}", e)))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Self { columns, rows })
    }

    /// Serialize with standard CSV quoting. Round-trips through
    /// [`Dataset::from_csv`] unchanged.
    pub fn to_csv(&self) -> DaichoResult<String> {
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)
            .map_err(|e| ParseError(format!("Failed to write header row: {}", e)))?;
        for row in &self.rows {
            writer.write_record(row)
                .map_err(|e| ParseError(format!("Failed to write record: {}", e)))?;
        }

        let buffer = writer.into_inner()
            .map_err(|e| ParseError(format!("Failed to flush csv writer: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| ParseError(format!("Serialized csv is not valid UTF-8: {}", e)))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn push_row(&mut self, row: Vec<String>) -> DaichoResult<()> {
        if row.len() != self.columns.len() {
            return Err(InvalidArgumentError(
                format!("Row has {} fields but the header has {}",
                        row.len(), self.columns.len())));
        }
        self.rows.push(row);

        Ok(())
    }

    /// Overwrite one cell, addressed by row index and column name.
    pub fn set_value(&mut self, row_index: usize, column: &str, value: &str) -> DaichoResult<()> {
        let column_index = self.columns
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| InvalidArgumentError(format!("Unknown column: {}", column)))?;
        let row = self.rows
            .get_mut(row_index)
            .ok_or_else(|| InvalidArgumentError(format!("Row index {} is out of range", row_index)))?;
        row[column_index] = value.to_string();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::DaichoError;
    use super::*;

    #[test]
    fn test_from_csv_header_and_rows() {
        let dataset = Dataset::from_csv("col1,col2\nval1,val2").unwrap();
        assert_eq!(dataset.columns(), ["col1", "col2"]);
        assert_eq!(dataset.row_count(), 1);
        assert_eq!(dataset.rows()[0], ["val1", "val2"]);
    }

    #[test]
    fn test_from_csv_row_count_matches_data_lines() {
        let dataset = Dataset::from_csv("a,b\n1,2\n3,4\n5,6\n").unwrap();
        assert_eq!(dataset.row_count(), 3);
    }

    #[test]
    fn test_from_csv_quoted_fields() {
        let dataset = Dataset::from_csv("name,notes\nalice,\"likes, commas\"").unwrap();
        assert_eq!(dataset.rows()[0][1], "likes, commas");
    }

    #[test]
    fn test_from_csv_rejects_empty_content() {
        assert!(matches!(Dataset::from_csv("  \n"), Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_from_csv_rejects_ragged_rows() {
        let result = Dataset::from_csv("a,b\n1,2,3");
        assert!(matches!(result, Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_round_trip() {
        let dataset = Dataset::new(
            vec!["name".to_string(), "notes".to_string()],
            vec![
                vec!["alice".to_string(), "likes, commas".to_string()],
                vec!["bob".to_string(), String::new()],
            ],
        ).unwrap();

        let reparsed = Dataset::from_csv(&dataset.to_csv().unwrap()).unwrap();
        assert_eq!(reparsed, dataset);
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        );
        assert!(matches!(result, Err(DaichoError::ParseError(_))));
    }

    #[test]
    fn test_push_row_width_check() {
        let mut dataset = Dataset::from_csv("a,b\n1,2").unwrap();
        assert!(dataset.push_row(vec!["3".to_string(), "4".to_string()]).is_ok());
        assert!(matches!(
            dataset.push_row(vec!["5".to_string()]),
            Err(DaichoError::InvalidArgumentError(_))));
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn test_set_value() {
        let mut dataset = Dataset::from_csv("a,b\n1,2").unwrap();
        dataset.set_value(0, "b", "20").unwrap();
        assert_eq!(dataset.rows()[0], ["1", "20"]);

        assert!(dataset.set_value(0, "missing", "x").is_err());
        assert!(dataset.set_value(9, "a", "x").is_err());
    }
}
