//! Error types for database access and per-table loading.

use std::path::PathBuf;
use thiserror::Error;

use tabload_ingest::IngestError;

/// Errors raised by a [`Database`](crate::Database) backend.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened or created.
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The directory holding the database file could not be created.
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row did not supply one value per statement placeholder.
    #[error("statement expects {expected} parameters but row {row} has {found}")]
    ParameterCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Error reported by SQLite.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for database operations.
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Why one table could not be provisioned or loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading or inferring the source file failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Executing against the database failed.
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Result type for per-table operations.
pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count_display() {
        let err = DbError::ParameterCount {
            row: 4,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "statement expects 3 parameters but row 4 has 2"
        );
    }

    #[test]
    fn test_load_error_from_ingest() {
        let err: LoadError = IngestError::EmptyCsv {
            path: PathBuf::from("empty.csv"),
        }
        .into();
        assert!(matches!(err, LoadError::Ingest(_)));
        assert_eq!(err.to_string(), "source file is empty: empty.csv");
    }
}
