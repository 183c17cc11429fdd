//! Command-line layer for tabload: argument parsing, logging setup and
//! terminal summaries.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
