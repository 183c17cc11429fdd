//! Header row parsing and normalization.

use std::path::Path;

use csv::StringRecord;

use crate::error::{IngestError, Result};

/// Column names taken from the first row of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    /// Normalized column names in file order.
    pub columns: Vec<String>,
}

impl CsvHeaders {
    /// Builds headers from the raw first record of `path`.
    ///
    /// Names are kept verbatim apart from a leading byte-order mark. Fails when
    /// the record is missing, entirely blank, or has a blank column.
    pub fn from_record(record: &StringRecord, path: &Path) -> Result<Self> {
        if record.is_empty() {
            return Err(IngestError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }

        let columns: Vec<String> = record.iter().map(normalize_header).collect();
        if columns.iter().all(|c| is_blank(c)) {
            return Err(IngestError::NoHeaderDetected {
                path: path.to_path_buf(),
            });
        }
        if let Some(index) = columns.iter().position(|c| is_blank(c)) {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
                index,
            });
        }

        Ok(Self { columns })
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

/// Strips a byte-order mark left on the first header value.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').to_string()
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_from_record() {
        let fields = record(&["id", " name ", "score"]);
        let headers = CsvHeaders::from_record(&fields, Path::new("a.csv")).unwrap();
        // Identifiers are used as written; no trimming
        assert_eq!(headers.columns, vec!["id", " name ", "score"]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_from_record_empty() {
        let result = CsvHeaders::from_record(&StringRecord::new(), Path::new("a.csv"));
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_from_record_blank() {
        let result = CsvHeaders::from_record(&record(&["", "  "]), Path::new("a.csv"));
        assert!(matches!(result, Err(IngestError::NoHeaderDetected { .. })));
    }

    #[test]
    fn test_from_record_blank_column() {
        let result = CsvHeaders::from_record(&record(&["id", "", "score"]), Path::new("a.csv"));
        assert!(matches!(
            result,
            Err(IngestError::EmptyColumnName { index: 1, .. })
        ));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  hello  "), "  hello  ");
        assert_eq!(normalize_header("\u{feff}id"), "id");
        assert_eq!(normalize_header("hello"), "hello");
    }
}
