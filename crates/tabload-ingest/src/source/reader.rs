//! Streaming reader over one delimited source file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord, Terminator};

use crate::error::{IngestError, Result};

use super::header::CsvHeaders;

/// One data row ready for binding: `None` stands for SQL NULL.
pub type Row = Vec<Option<String>>;

/// How source files are recognized and split into fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// File extension that selects source files, compared case-insensitively.
    pub extension: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            extension: "csv".to_string(),
        }
    }
}

/// Reads the header of a source file eagerly, then hands out rows one at a time.
///
/// The reader is strict: every row must have exactly one field per header
/// column, otherwise the read fails with [`IngestError::ColumnCountMismatch`].
/// A blank line between rows counts as a row. In a single-column file it is a
/// NULL value; with more columns it is a zero-field row and fails the read.
/// Blank lines after the last row are ignored.
pub struct SourceReader {
    path: PathBuf,
    headers: CsvHeaders,
    reader: Reader<File>,
    record: StringRecord,
    /// Size of the file in bytes and whether its last byte is `\n`.
    len: u64,
    ends_with_newline: bool,
    /// Blank rows still owed before `record` is handed out.
    pending_blanks: u64,
    /// `record` was read but not yet returned.
    buffered: bool,
    blank: StringRecord,
}

impl std::fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReader")
            .field("path", &self.path)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl SourceReader {
    /// Opens `path` and reads its header row.
    pub fn open(path: &Path, options: &SourceOptions) -> Result<Self> {
        let read_error = |e: io::Error| {
            if e.kind() == io::ErrorKind::NotFound {
                IngestError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IngestError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        };
        let mut file = File::open(path).map_err(read_error)?;
        let (len, ends_with_newline) = file_tail(&mut file).map_err(read_error)?;

        // Only `\n` ends a record, so line counts stay exact; a trailing `\r` is
        // stripped from the last field instead.
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .delimiter(options.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_reader(file);

        let mut header_record = reader
            .headers()
            .map_err(|e| IngestError::from_csv(path, e))?
            .clone();
        strip_carriage_return(&mut header_record);
        let headers = CsvHeaders::from_record(&header_record, path)?;

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            reader,
            record: StringRecord::new(),
            len,
            ends_with_newline,
            pending_blanks: 0,
            buffered: false,
            blank: StringRecord::from(vec![""]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &CsvHeaders {
        &self.headers
    }

    /// Advances to the next data row and borrows its raw fields.
    pub fn next_record(&mut self) -> Result<Option<&StringRecord>> {
        if self.pending_blanks > 0 {
            self.pending_blanks -= 1;
            return Ok(Some(&self.blank));
        }
        if self.buffered {
            self.buffered = false;
            return Ok(Some(&self.record));
        }

        let start_line = self.reader.position().line();
        let has_row = self
            .reader
            .read_record(&mut self.record)
            .map_err(|e| IngestError::from_csv(&self.path, e))?;
        if !has_row {
            return Ok(None);
        }
        strip_carriage_return(&mut self.record);

        let blanks = self.blank_lines_before(start_line);
        if blanks == 0 {
            return Ok(Some(&self.record));
        }
        if self.headers.len() != 1 {
            return Err(IngestError::ColumnCountMismatch {
                path: self.path.clone(),
                line: start_line,
                expected: u64::try_from(self.headers.len()).unwrap_or(u64::MAX),
                found: 0,
            });
        }
        self.pending_blanks = blanks - 1;
        self.buffered = true;
        Ok(Some(&self.blank))
    }

    /// Advances to the next data row, turning empty fields into NULL.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        Ok(self.next_record()?.map(to_nullable_row))
    }

    /// Counts the blank lines the parser skipped before the record just read.
    ///
    /// Lines consumed by the read are the skipped blank lines, the newlines
    /// quoted inside fields, and the record's own terminator (absent only for
    /// an unterminated last line).
    fn blank_lines_before(&self, start_line: u64) -> u64 {
        let end = self.reader.position();
        let consumed = end.line().saturating_sub(start_line);
        let embedded: usize = self
            .record
            .iter()
            .map(|field| field.bytes().filter(|b| *b == b'\n').count())
            .sum();
        let embedded = u64::try_from(embedded).unwrap_or(u64::MAX);
        let terminator = u64::from(end.byte() < self.len || self.ends_with_newline);
        consumed.saturating_sub(embedded.saturating_add(terminator))
    }
}

/// Converts raw fields into a bindable row. Only exactly-empty fields become NULL.
pub fn to_nullable_row(record: &StringRecord) -> Row {
    record
        .iter()
        .map(|field| (!field.is_empty()).then(|| field.to_string()))
        .collect()
}

/// Drops the `\r` a CRLF line ending leaves on the last field.
fn strip_carriage_return(record: &mut StringRecord) {
    let Some(trimmed) = record
        .iter()
        .last()
        .and_then(|last| last.strip_suffix('\r'))
        .map(str::to_string)
    else {
        return;
    };
    record.truncate(record.len() - 1);
    record.push_field(&trimmed);
}

fn file_tail(file: &mut File) -> io::Result<(u64, bool)> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok((0, false));
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    file.rewind()?;
    Ok((len, last[0] == b'\n'))
}
