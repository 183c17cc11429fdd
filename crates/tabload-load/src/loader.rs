//! Bulk loader: streams each source file into its table in committed batches.

use std::path::{Path, PathBuf};

use tracing::{error, info, info_span};

use tabload_ingest::{CsvHeaders, Row, SourceOptions, SourceReader, resolve_source_path};

use crate::database::Database;
use crate::error::Result;
use crate::gate::LoadGate;
use crate::outcome::LoadReport;

/// Rows per insert batch when no other size is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Upper bound on the rows buffered up front; the batch grows past it on demand.
const INITIAL_BATCH_CAPACITY: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows per insert-and-commit. Zero is treated as one.
    pub batch_size: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadOptions {
    fn effective_batch_size(self) -> usize {
        self.batch_size.max(1)
    }
}

/// Builds the parameterized insert reused for every batch of a table.
pub fn insert_sql(table_name: &str, headers: &CsvHeaders) -> String {
    let columns = headers.columns.join(", ");
    let placeholders = vec!["?"; headers.len()].join(", ");
    format!("INSERT INTO {table_name} ({columns}) VALUES ({placeholders})")
}

pub struct BulkLoader<'a, D: Database + ?Sized> {
    db: &'a mut D,
    folder: PathBuf,
    source: SourceOptions,
    options: LoadOptions,
}

impl<'a, D: Database + ?Sized> BulkLoader<'a, D> {
    pub fn new(db: &'a mut D, folder: impl Into<PathBuf>) -> Self {
        Self {
            db,
            folder: folder.into(),
            source: SourceOptions::default(),
            options: LoadOptions::default(),
        }
    }

    #[must_use]
    pub fn with_source_options(mut self, source: SourceOptions) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Loads each named table in order.
    ///
    /// Tables that already hold rows (or whose probe fails) are skipped without
    /// opening their file. Any other failure is logged and recorded, and the
    /// next table is attempted.
    pub fn load_all<S: AsRef<str>>(&mut self, table_names: &[S]) -> LoadReport {
        let mut report = LoadReport::default();

        for table_name in table_names {
            let table_name = table_name.as_ref();
            let span = info_span!("load", table = %table_name);
            let _guard = span.enter();

            if !LoadGate::new(&mut *self.db).is_empty(table_name) {
                info!(
                    table = %table_name,
                    "table {table_name} already has data, skipping insertion completely"
                );
                report.skipped.push(table_name.to_string());
                continue;
            }

            info!(table = %table_name, "insertion started for table {table_name}");
            match self.load_table(table_name) {
                Ok(rows) => {
                    info!(table = %table_name, rows, "completed insertion for table {table_name}");
                    report.injected.push(table_name.to_string());
                    report.rows.push(rows);
                }
                Err(e) => {
                    error!(
                        table = %table_name,
                        error = %e,
                        "error inserting rows into table {table_name}"
                    );
                    report.failed.push(table_name.to_string());
                }
            }
        }

        report
    }

    /// Streams one table's source file into the table, bypassing the gate.
    ///
    /// Returns the number of rows inserted. Batches committed before an error
    /// stay committed.
    pub fn load_table(&mut self, table_name: &str) -> Result<usize> {
        let path = resolve_source_path(&self.folder, table_name, &self.source)?;
        let mut reader = SourceReader::open(&path, &self.source)?;
        let sql = insert_sql(table_name, reader.headers());

        let batch_size = self.options.effective_batch_size();
        let mut batch: Vec<Row> = Vec::with_capacity(batch_size.min(INITIAL_BATCH_CAPACITY));
        let mut total = 0usize;

        while let Some(row) = reader.next_row()? {
            batch.push(row);
            if batch.len() == batch_size {
                total += self.flush(&sql, &mut batch)?;
                info!(table = %table_name, total, "{table_name}: inserted {total} rows");
            }
        }

        if !batch.is_empty() {
            total += self.flush(&sql, &mut batch)?;
            info!(table = %table_name, total, "{table_name}: final inserted {total} rows");
        }

        Ok(total)
    }

    /// Inserts and commits the buffered rows, then clears the buffer.
    fn flush(&mut self, sql: &str, batch: &mut Vec<Row>) -> Result<usize> {
        self.db.execute_many(sql, batch.as_slice())?;
        self.db.commit()?;
        let flushed = batch.len();
        batch.clear();
        Ok(flushed)
    }
}
