//! Delimited source file reading.

mod header;
mod reader;

pub use header::CsvHeaders;
pub use reader::{Row, SourceOptions, SourceReader};
