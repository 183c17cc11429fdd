//! The database seam used by every pipeline component.
//!
//! Statements run inside an implicit transaction that stays open until
//! [`Database::commit`] is called, the way DB-API style drivers behave. The
//! pipeline commits after every DDL statement and every insert batch.

mod sqlite;

pub use sqlite::SqliteDatabase;

use tabload_ingest::Row;

use crate::error::DbResult;

/// A live relational connection, borrowed by the pipeline for one run.
pub trait Database {
    /// Executes a statement without parameters (DDL).
    fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Executes a parameterized statement once per row, binding values
    /// positionally, and returns the number of affected rows.
    ///
    /// On error, nothing from this call remains pending.
    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> DbResult<usize>;

    /// Runs a query and reports whether it returned at least one row.
    fn query_exists(&mut self, sql: &str) -> DbResult<bool>;

    /// Commits the pending transaction. A no-op when nothing is pending.
    fn commit(&mut self) -> DbResult<()>;
}

impl<D: Database + ?Sized> Database for &mut D {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        (**self).execute(sql)
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> DbResult<usize> {
        (**self).execute_many(sql, rows)
    }

    fn query_exists(&mut self, sql: &str) -> DbResult<bool> {
        (**self).query_exists(sql)
    }

    fn commit(&mut self) -> DbResult<()> {
        (**self).commit()
    }
}
