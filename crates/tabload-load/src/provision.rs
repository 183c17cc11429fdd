//! Table provisioning: one `CREATE TABLE IF NOT EXISTS` per source file.

use std::path::{Path, PathBuf};

use tracing::{error, info, info_span};

use tabload_ingest::{
    InferOptions, InferredSchema, SourceFile, SourceOptions, infer_schema, list_source_files,
};

use crate::database::Database;
use crate::error::Result;
use crate::outcome::ProvisionReport;

/// Builds the idempotent DDL for `schema`.
///
/// Identifiers are used verbatim; quoting them is the caller's business.
pub fn create_table_sql(schema: &InferredSchema, table_name: &str) -> String {
    let lines: Vec<String> = schema
        .iter()
        .map(|column| format!("    {} {}", column.name, column.sql_type))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table_name}(\n{}\n);",
        lines.join(",\n")
    )
}

/// Creates one table per source file in a folder.
pub struct TableProvisioner<'a, D: Database + ?Sized> {
    db: &'a mut D,
    folder: PathBuf,
    source: SourceOptions,
    infer: InferOptions,
}

impl<'a, D: Database + ?Sized> TableProvisioner<'a, D> {
    pub fn new(db: &'a mut D, folder: impl Into<PathBuf>) -> Self {
        Self {
            db,
            folder: folder.into(),
            source: SourceOptions::default(),
            infer: InferOptions::default(),
        }
    }

    #[must_use]
    pub fn with_source_options(mut self, source: SourceOptions) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_infer_options(mut self, infer: InferOptions) -> Self {
        self.infer = infer;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Executes and commits the `CREATE TABLE` for `schema`.
    ///
    /// Failures are logged with the table name before being returned.
    pub fn create(&mut self, schema: &InferredSchema, table_name: &str) -> Result<()> {
        let sql = create_table_sql(schema, table_name);
        let result: Result<()> = self
            .db
            .execute(&sql)
            .and_then(|()| self.db.commit())
            .map_err(Into::into);

        match &result {
            Ok(()) => info!(
                table = %table_name,
                columns = schema.len(),
                "{table_name} table created successfully"
            ),
            Err(e) => error!(
                table = %table_name,
                error = %e,
                "error in {table_name} table creation"
            ),
        }
        result
    }

    /// Provisions every source file in the folder.
    ///
    /// Never fails as a whole: each file lands in `created` or `failed`, and a
    /// folder that cannot be listed is logged and yields an empty report.
    pub fn provision_all(&mut self) -> ProvisionReport {
        let mut report = ProvisionReport::default();

        let files = match list_source_files(&self.folder, &self.source) {
            Ok(files) => files,
            Err(e) => {
                error!(folder = %self.folder.display(), error = %e, "could not list source files");
                return report;
            }
        };
        info!(folder = %self.folder.display(), files = files.len(), "provisioning tables");

        for file in &files {
            let span = info_span!("provision", table = %file.table_name);
            let _guard = span.enter();
            match self.provision_file(file) {
                Ok(()) => report.created.push(file.table_name.clone()),
                Err(_) => report.failed.push(file.table_name.clone()),
            }
        }

        report
    }

    /// Infers one file's schema, then creates its table.
    pub fn provision_file(&mut self, file: &SourceFile) -> Result<()> {
        let schema = infer_schema(&file.path, &self.source, &self.infer).inspect_err(|e| {
            error!(
                table = %file.table_name,
                path = %file.path.display(),
                error = %e,
                "failed processing file"
            );
        })?;
        self.create(&schema, &file.table_name)
    }
}
