//! Loading delimited source files into a relational database.
//!
//! The pipeline has three stages per table, each recoverable on its own:
//!
//! 1. [`TableProvisioner`] infers a schema and issues `CREATE TABLE IF NOT EXISTS`
//! 2. [`LoadGate`] probes the table and skips it if it already holds rows
//! 3. [`BulkLoader`] streams the file in batches, committing after each one
//!
//! Failures never cross a table boundary: they are logged through `tracing`
//! and the table lands in the matching outcome list.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabload_load::{PipelineOptions, SqliteDatabase, run_pipeline};
//!
//! let mut db = SqliteDatabase::open("inventory.db")?;
//! let report = run_pipeline(&mut db, Path::new("data"), &PipelineOptions::default());
//! println!("created: {:?}", report.provision.created);
//! db.close()?;
//! ```

mod database;
mod error;
mod gate;
mod loader;
mod outcome;
mod pipeline;
mod provision;

// === Error Types ===
pub use error::{DbError, DbResult, LoadError, Result};

// === Database ===
pub use database::{Database, SqliteDatabase};

// === Pipeline Components ===
pub use gate::{LoadGate, probe_sql};
pub use loader::{BulkLoader, DEFAULT_BATCH_SIZE, LoadOptions, insert_sql};
pub use provision::{TableProvisioner, create_table_sql};

// === Outcomes ===
pub use outcome::{LoadOutcome, LoadReport, ProvisionReport, RunReport, TableOutcome};

// === Runner ===
pub use pipeline::{PipelineOptions, run_pipeline};
