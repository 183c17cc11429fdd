//! Provision-then-load run over one folder.

use std::path::Path;

use tracing::{info, info_span};

use tabload_ingest::{InferOptions, SourceOptions};

use crate::database::Database;
use crate::loader::{BulkLoader, LoadOptions};
use crate::outcome::RunReport;
use crate::provision::TableProvisioner;

/// Settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub source: SourceOptions,
    pub infer: InferOptions,
    pub load: LoadOptions,
    /// Create tables only; do not insert rows.
    pub skip_load: bool,
}

/// Creates a table for every source file in `folder`, then loads the tables
/// that were created. Tables whose creation failed are never loaded.
///
/// The connection is borrowed for the run and left open.
pub fn run_pipeline<D: Database + ?Sized>(
    db: &mut D,
    folder: &Path,
    options: &PipelineOptions,
) -> RunReport {
    let span = info_span!("run", folder = %folder.display());
    let _guard = span.enter();

    let provision = TableProvisioner::new(&mut *db, folder)
        .with_source_options(options.source.clone())
        .with_infer_options(options.infer)
        .provision_all();
    info!(
        created = provision.created.len(),
        failed = provision.failed.len(),
        "table provisioning finished"
    );

    if options.skip_load {
        return RunReport {
            provision,
            load: None,
        };
    }

    let load = BulkLoader::new(&mut *db, folder)
        .with_source_options(options.source.clone())
        .with_options(options.load)
        .load_all(provision.created.as_slice());
    info!(
        injected = load.injected.len(),
        skipped = load.skipped.len(),
        failed = load.failed.len(),
        rows = load.total_rows(),
        "bulk load finished"
    );

    RunReport {
        provision,
        load: Some(load),
    }
}
