//! Schema inference over the leading rows of a source file.
//!
//! Each column starts with every candidate domain still possible. Every
//! sampled, non-empty value removes the candidates it does not parse as. The
//! column ends up with the first surviving candidate in the order
//! integer, float, boolean, timestamp, or `Text` when none survive.
//!
//! Empty fields are NULL and say nothing about the type. A column with no
//! non-empty sampled value (including every column of a header-only file) is
//! `Text`.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::source::{SourceOptions, SourceReader};
use crate::types::{SqlType, ValueDomain};

/// Number of data rows sampled when no other size is configured.
pub const DEFAULT_SAMPLE_ROWS: usize = 1000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferOptions {
    /// Maximum number of data rows read per file.
    pub sample_rows: usize,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

/// One inferred column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub domain: ValueDomain,
    pub sql_type: SqlType,
}

/// Ordered column list inferred from a sample; one entry per header column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredSchema {
    pub columns: Vec<ColumnSchema>,
    /// Data rows actually sampled (at most `sample_rows`).
    pub sampled_rows: usize,
}

impl InferredSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Narrows one column's domain as values are observed.
#[derive(Debug, Clone, Copy)]
pub struct ColumnClassifier {
    /// Still-possible flags, indexed like [`ValueDomain::CANDIDATES`].
    possible: [bool; 4],
    observed: usize,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self {
            possible: [true; 4],
            observed: 0,
        }
    }
}

impl ColumnClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw field. Empty fields are ignored.
    pub fn observe(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.observed += 1;
        for (index, domain) in ValueDomain::CANDIDATES.iter().enumerate() {
            if self.possible[index] && !matches_domain(*domain, value) {
                self.possible[index] = false;
            }
        }
    }

    /// Number of non-empty values observed.
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn finish(&self) -> ValueDomain {
        if self.observed == 0 {
            return ValueDomain::Text;
        }
        ValueDomain::CANDIDATES
            .iter()
            .zip(self.possible)
            .find_map(|(domain, possible)| possible.then_some(*domain))
            .unwrap_or(ValueDomain::Text)
    }
}

/// Classifies a full column of raw values.
pub fn classify_column<'a, I>(values: I) -> ValueDomain
where
    I: IntoIterator<Item = &'a str>,
{
    let mut classifier = ColumnClassifier::new();
    for value in values {
        classifier.observe(value);
    }
    classifier.finish()
}

fn matches_domain(domain: ValueDomain, value: &str) -> bool {
    match domain {
        ValueDomain::Integer => value.parse::<i64>().is_ok(),
        ValueDomain::Float => value.parse::<f64>().is_ok(),
        ValueDomain::Boolean => is_boolean_literal(value),
        ValueDomain::Timestamp => is_timestamp_literal(value),
        ValueDomain::Text => true,
    }
}

fn is_boolean_literal(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

fn is_timestamp_literal(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
}

/// Infers the schema of the source file at `path` from its first
/// `options.sample_rows` data rows.
///
/// Fails when the file cannot be opened, has no header, or holds malformed
/// rows within the sample.
pub fn infer_schema(
    path: &Path,
    source: &SourceOptions,
    options: &InferOptions,
) -> Result<InferredSchema> {
    let mut reader = SourceReader::open(path, source)?;
    let mut classifiers = vec![ColumnClassifier::new(); reader.headers().len()];

    let mut sampled_rows = 0usize;
    while sampled_rows < options.sample_rows {
        let Some(record) = reader.next_record()? else {
            break;
        };
        for (classifier, value) in classifiers.iter_mut().zip(record.iter()) {
            classifier.observe(value);
        }
        sampled_rows += 1;
    }

    let columns: Vec<ColumnSchema> = reader
        .headers()
        .iter()
        .zip(&classifiers)
        .map(|(name, classifier)| {
            let domain = classifier.finish();
            ColumnSchema {
                name: name.to_string(),
                domain,
                sql_type: domain.sql_type(),
            }
        })
        .collect();

    debug!(
        path = %path.display(),
        columns = columns.len(),
        sampled_rows,
        "inferred schema"
    );

    Ok(InferredSchema {
        columns,
        sampled_rows,
    })
}
