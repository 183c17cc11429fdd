//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use tabload_ingest::Row;
use tabload_load::{Database, DbError, DbResult};

/// One call made against a [`RecordingDatabase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Execute(String),
    ExecuteMany { sql: String, rows: Vec<Row> },
    Query(String),
    Commit,
}

/// In-memory stand-in that records every call and fakes table contents.
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    pub calls: Vec<Call>,
    /// Tables the probe reports as holding rows.
    pub populated: BTreeSet<String>,
    /// Tables whose probe fails.
    pub failing_probes: BTreeSet<String>,
    /// Tables whose `CREATE TABLE` fails.
    pub failing_creates: BTreeSet<String>,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_batches(&self) -> Vec<&Vec<Row>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::ExecuteMany { rows, .. } => Some(rows),
                _ => None,
            })
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Commit)).count()
    }
}

fn table_after<'a>(sql: &'a str, prefix: &str) -> &'a str {
    sql.strip_prefix(prefix)
        .unwrap_or(sql)
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
}

fn fake_failure() -> DbError {
    DbError::Sqlite(rusqlite::Error::InvalidQuery)
}

impl Database for RecordingDatabase {
    fn execute(&mut self, sql: &str) -> DbResult<()> {
        self.calls.push(Call::Execute(sql.to_string()));
        let table = table_after(sql, "CREATE TABLE IF NOT EXISTS ");
        if self.failing_creates.contains(table) {
            return Err(fake_failure());
        }
        Ok(())
    }

    fn execute_many(&mut self, sql: &str, rows: &[Row]) -> DbResult<usize> {
        self.calls.push(Call::ExecuteMany {
            sql: sql.to_string(),
            rows: rows.to_vec(),
        });
        if !rows.is_empty() {
            self.populated
                .insert(table_after(sql, "INSERT INTO ").to_string());
        }
        Ok(rows.len())
    }

    fn query_exists(&mut self, sql: &str) -> DbResult<bool> {
        self.calls.push(Call::Query(sql.to_string()));
        let table = table_after(sql, "SELECT 1 FROM ");
        if self.failing_probes.contains(table) {
            return Err(fake_failure());
        }
        Ok(self.populated.contains(table))
    }

    fn commit(&mut self) -> DbResult<()> {
        self.calls.push(Call::Commit);
        Ok(())
    }
}

/// Writes `files` (name, content) into a fresh directory.
pub fn source_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

pub fn path_in(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

/// Captures formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
    }
}

pub struct LogBufferGuard {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogBufferGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferGuard {
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Runs `f` with a subscriber that writes plain text into the returned buffer.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, buffer.contents())
}
