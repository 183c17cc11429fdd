//! Load gate: keeps re-runs from inserting into tables that already hold rows.

use tracing::error;

use crate::database::Database;
use crate::error::DbResult;

/// The single-row existence probe for `table_name`.
pub fn probe_sql(table_name: &str) -> String {
    format!("SELECT 1 FROM {table_name} LIMIT 1")
}

pub struct LoadGate<'a, D: Database + ?Sized> {
    db: &'a mut D,
}

impl<'a, D: Database + ?Sized> LoadGate<'a, D> {
    pub fn new(db: &'a mut D) -> Self {
        Self { db }
    }

    /// Returns whether `table_name` holds at least one row, or the probe error.
    pub fn probe(&mut self, table_name: &str) -> DbResult<bool> {
        self.db.query_exists(&probe_sql(table_name))
    }

    /// Returns true only when the probe succeeds and finds no row.
    ///
    /// A failed probe is logged and reported as non-empty, so the caller skips
    /// the table rather than risk inserting duplicates.
    pub fn is_empty(&mut self, table_name: &str) -> bool {
        match self.probe(table_name) {
            Ok(has_rows) => !has_rows,
            Err(e) => {
                error!(
                    table = %table_name,
                    error = %e,
                    "error checking table {table_name} emptiness"
                );
                false
            }
        }
    }
}
