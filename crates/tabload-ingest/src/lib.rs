//! Source ingestion for tabload.
//!
//! This crate knows everything about the delimited source files and nothing
//! about the database they end up in.
//!
//! # Features
//!
//! - **Discovery**: Find source files in a folder and derive table names from them
//! - **Streaming reads**: Read the header, then rows one at a time with empty fields as NULL
//! - **Schema inference**: Classify sampled columns and map them to column types
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabload_ingest::{InferOptions, SourceOptions, infer_schema, list_source_files};
//!
//! let options = SourceOptions::default();
//! for file in list_source_files(Path::new("data"), &options)? {
//!     let schema = infer_schema(&file.path, &options, &InferOptions::default())?;
//!     println!("{}: {} columns", file.table_name, schema.len());
//! }
//! ```

mod discovery;
mod error;
mod infer;
mod source;
mod types;

// === Error Types ===
pub use error::{IngestError, Result};

// === Source Reading ===
pub use source::{CsvHeaders, Row, SourceOptions, SourceReader};

// === File Discovery ===
pub use discovery::{SourceFile, list_source_files, resolve_source_path, table_name_for};

// === Schema Inference ===
pub use infer::{
    ColumnClassifier, ColumnSchema, DEFAULT_SAMPLE_ROWS, InferOptions, InferredSchema,
    classify_column, infer_schema,
};

// === Column Types ===
pub use types::{SqlType, ValueDomain};
