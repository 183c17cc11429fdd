//! Value domains and the column types they map to.

use std::fmt;

use serde::Serialize;

/// The narrowest kind of value observed in a sampled column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDomain {
    Integer,
    Float,
    Boolean,
    Timestamp,
    Text,
}

impl ValueDomain {
    /// Candidates tried by the classifier, narrowest first. `Text` always matches.
    pub const CANDIDATES: [ValueDomain; 4] = [
        ValueDomain::Integer,
        ValueDomain::Float,
        ValueDomain::Boolean,
        ValueDomain::Timestamp,
    ];

    /// Parses a domain tag as written by dataframe libraries and loaders.
    ///
    /// Unknown tags (including `object`, `mixed`, `string`) are `Text`.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "int64" | "int" | "integer" | "i64" => Self::Integer,
            "float64" | "float" | "double" | "f64" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            "timestamp" | "datetime" => Self::Timestamp,
            _ if tag.starts_with("datetime64") => Self::Timestamp,
            _ => Self::Text,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Integer => "int64",
            Self::Float => "float64",
            Self::Boolean => "bool",
            Self::Timestamp => "datetime64",
            Self::Text => "text",
        }
    }

    /// Maps the domain to its fixed column type.
    pub fn sql_type(self) -> SqlType {
        match self {
            Self::Integer => SqlType::Int,
            Self::Float => SqlType::Float,
            Self::Boolean => SqlType::Boolean,
            Self::Timestamp => SqlType::DateTime,
            Self::Text => SqlType::Varchar,
        }
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Target column type used in `CREATE TABLE` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SqlType {
    Int,
    Float,
    Boolean,
    DateTime,
    /// `VARCHAR(255)`, the fallback for anything not recognized.
    Varchar,
}

impl SqlType {
    /// Maps a raw domain tag to a column type. Never fails: unknown tags give `VARCHAR(255)`.
    pub fn for_tag(tag: &str) -> Self {
        ValueDomain::from_tag(tag).sql_type()
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "DATETIME",
            Self::Varchar => "VARCHAR(255)",
        }
    }
}

impl From<ValueDomain> for SqlType {
    fn from(domain: ValueDomain) -> Self {
        domain.sql_type()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
