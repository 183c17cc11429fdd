//! Source file discovery for a load folder.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::source::SourceOptions;

/// A source file together with the table it loads into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path to the source file.
    pub path: PathBuf,
    /// Target table name (the file name without its extension).
    pub table_name: String,
}

/// Derives the target table name for a source file: its file stem, verbatim.
pub fn table_name_for(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Lists all source files in a directory.
///
/// A file is selected when its extension matches `options.extension`
/// case-insensitively. Returns files sorted by filename.
pub fn list_source_files(dir: &Path, options: &SourceOptions) -> Result<Vec<SourceFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() || !has_extension(&path, &options.extension) {
            continue;
        }

        match table_name_for(&path) {
            Some(table_name) => files.push(SourceFile { path, table_name }),
            None => tracing::warn!(path = %path.display(), "skipping file without a usable name"),
        }
    }

    // Sort by filename
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    Ok(files)
}

/// Finds the source file backing `table_name` in `dir`.
///
/// Tries `<table_name>.<extension>` first, then falls back to any file with the
/// same stem whose extension differs only in case (e.g. `orders.CSV`).
pub fn resolve_source_path(
    dir: &Path,
    table_name: &str,
    options: &SourceOptions,
) -> Result<PathBuf> {
    let direct = dir.join(format!("{table_name}.{}", options.extension));
    if direct.is_file() {
        return Ok(direct);
    }

    let fallback = list_source_files(dir, options)?
        .into_iter()
        .find(|file| file.table_name == table_name)
        .map(|file| file.path);

    fallback.ok_or(IngestError::FileNotFound { path: direct })
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
