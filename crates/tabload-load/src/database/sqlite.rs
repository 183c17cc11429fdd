//! SQLite backend.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, warn};

use tabload_ingest::Row;

use crate::error::{DbError, DbResult};

use super::Database;

/// A SQLite connection with explicit-commit semantics.
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteDatabase {
    /// Opens the database at `path`, creating the file and its directory if needed.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if path == Path::new(":memory:") {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DbError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path).map_err(|e| DbError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "opened database");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;
        Ok(Self { conn, path: None })
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrows the raw connection, e.g. for ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, rolling back anything left uncommitted.
    pub fn close(self) -> DbResult<()> {
        if !self.conn.is_autocommit() {
            warn!("closing database with an uncommitted transaction; rolling back");
            self.conn.execute_batch("ROLLBACK")?;
        }
        self.conn.close().map_err(|(_, e)| DbError::Sqlite(e))
    }

    fn begin(&self) -> DbResult<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    fn rollback(&self) {
        if self.conn.is_autocommit() {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            warn!(error = %e, "rollback failed");
        }
    }

    fn insert_rows(&self, sql: &str, rows: &[Row]) -> DbResult<usize> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let expected = stmt.parameter_count();
        let mut affected = 0usize;
        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(DbError::ParameterCount {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            affected += stmt.execute(params_from_iter(row.iter()))?;
        }
        Ok(affected)
    }
}

impl Database for SqliteDatabase {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.begin()?;
        let result = self.conn.execute_batch(sql).map_err(DbError::from);
        if result.is_err() {
            self.rollback();
        }
        result
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> DbResult<usize> {
        self.begin()?;
        let result = self.insert_rows(sql, rows);
        if result.is_err() {
            self.rollback();
        }
        result
    }

    fn query_exists(&mut self, sql: &str) -> DbResult<bool> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let exists = rows.next()?.is_some();
        Ok(exists)
    }

    fn commit(&mut self) -> DbResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(db: &SqliteDatabase, table: &str) -> i64 {
        db.connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_execute_and_commit() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INT, b VARCHAR(255))").unwrap();
        assert!(!db.connection().is_autocommit());
        db.commit().unwrap();
        assert!(db.connection().is_autocommit());
    }

    #[test]
    fn test_execute_many_binds_nulls() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INT, b VARCHAR(255))").unwrap();
        db.commit().unwrap();

        let rows = vec![
            vec![Some("1".to_string()), Some("x".to_string())],
            vec![None, Some("y".to_string())],
        ];
        let affected = db.execute_many("INSERT INTO t (a, b) VALUES (?, ?)", &rows).unwrap();
        db.commit().unwrap();

        assert_eq!(affected, 2);
        assert_eq!(count(&db, "t"), 2);
        let nulls: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM t WHERE a IS NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(nulls, 1);
    }

    #[test]
    fn test_failed_batch_is_rolled_back() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INT)").unwrap();
        db.commit().unwrap();

        let rows = vec![vec![Some("1".to_string())], vec![]];
        let result = db.execute_many("INSERT INTO t (a) VALUES (?)", &rows);

        assert!(matches!(
            result,
            Err(DbError::ParameterCount {
                row: 1,
                expected: 1,
                found: 0
            })
        ));
        assert!(db.connection().is_autocommit());
        assert_eq!(count(&db, "t"), 0);
    }

    #[test]
    fn test_query_exists() {
        let mut db = SqliteDatabase::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (a INT)").unwrap();
        db.commit().unwrap();

        assert!(!db.query_exists("SELECT 1 FROM t LIMIT 1").unwrap());
        db.execute("INSERT INTO t VALUES (1)").unwrap();
        db.commit().unwrap();
        assert!(db.query_exists("SELECT 1 FROM t LIMIT 1").unwrap());
        assert!(db.query_exists("SELECT 1 FROM missing LIMIT 1").is_err());
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("load.db");

        let db = SqliteDatabase::open(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        db.close().unwrap();
        assert!(path.is_file());
    }
}
