use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, ensure};
use tracing::{error, info, info_span};

use tabload_ingest::{InferOptions, SourceOptions, infer_schema, list_source_files};
use tabload_load::{LoadOptions, PipelineOptions, RunReport, SqliteDatabase, run_pipeline};

use crate::cli::{LoadArgs, SchemaArgs, SourceArgs};
use crate::summary::schema_table;

/// File name of the database created inside the source folder by default.
pub const DEFAULT_DATABASE_NAME: &str = "tabload.db";

pub fn run_load(args: &LoadArgs) -> Result<RunReport> {
    let source_dir = &args.source.source_dir;
    ensure_source_dir(source_dir)?;
    let database = database_path(args);
    let span = info_span!("load", database = %database.display());
    let _guard = span.enter();

    let mut db = SqliteDatabase::open(&database)
        .with_context(|| format!("open database {}", database.display()))?;
    match db.path() {
        Some(path) => info!(path = %path.display(), "connected to database"),
        None => info!("connected to in-memory database"),
    }

    let options = pipeline_options(args);
    let started = Instant::now();
    let report = run_pipeline(&mut db, source_dir, &options);
    info!(elapsed = ?started.elapsed(), "run finished");

    db.close().context("close database")?;
    Ok(report)
}

/// Prints the inferred schema of every source file. Returns the number of
/// files whose schema could not be inferred.
pub fn run_schema(args: &SchemaArgs) -> Result<usize> {
    let source_dir = &args.source.source_dir;
    ensure_source_dir(source_dir)?;
    let source = source_options(&args.source);
    let infer = infer_options(&args.source);

    let files = list_source_files(source_dir, &source)
        .with_context(|| format!("list source files in {}", source_dir.display()))?;
    let mut failures = 0usize;
    for file in &files {
        match infer_schema(&file.path, &source, &infer) {
            Ok(schema) => println!("{}", schema_table(file, &schema)),
            Err(err) => {
                error!(table = %file.table_name, error = %err, "failed processing file");
                failures += 1;
            }
        }
    }
    Ok(failures)
}

pub fn database_path(args: &LoadArgs) -> PathBuf {
    args.database
        .clone()
        .unwrap_or_else(|| args.source.source_dir.join(DEFAULT_DATABASE_NAME))
}

pub fn pipeline_options(args: &LoadArgs) -> PipelineOptions {
    PipelineOptions {
        source: source_options(&args.source),
        infer: infer_options(&args.source),
        load: LoadOptions {
            batch_size: args.batch_size,
        },
        skip_load: args.skip_load,
    }
}

fn source_options(args: &SourceArgs) -> SourceOptions {
    SourceOptions {
        delimiter: args.delimiter,
        extension: args.extension.clone(),
    }
}

fn infer_options(args: &SourceArgs) -> InferOptions {
    InferOptions {
        sample_rows: args.sample_rows,
    }
}

fn ensure_source_dir(path: &Path) -> Result<()> {
    ensure!(
        path.is_dir(),
        "source folder {} does not exist or is not a directory",
        path.display()
    );
    Ok(())
}
