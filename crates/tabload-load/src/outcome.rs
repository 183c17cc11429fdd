//! Per-table outcome classification and the reports that aggregate it.

use std::fmt;

use serde::Serialize;

/// Where a table ended up in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Table created (or already present); loading not attempted.
    Created,
    /// Schema inference or `CREATE TABLE` failed.
    CreationFailed,
    /// Every row of the source file was inserted.
    Loaded,
    /// Table already held rows, or the probe could not tell.
    SkippedAlreadyLoaded,
    /// Reading or inserting failed part-way; committed batches remain.
    InsertionFailed,
}

impl LoadOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, Self::CreationFailed | Self::InsertionFailed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::CreationFailed => "creation failed",
            Self::Loaded => "loaded",
            Self::SkippedAlreadyLoaded => "skipped (already loaded)",
            Self::InsertionFailed => "insertion failed",
        }
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of provisioning every source file in a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Tables whose `CREATE TABLE IF NOT EXISTS` succeeded, in discovery order.
    pub created: Vec<String>,
    /// Tables whose inference or creation failed, in discovery order.
    pub failed: Vec<String>,
}

impl ProvisionReport {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.created.len() + self.failed.len()
    }
}

/// Result of bulk-loading a list of tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Tables fully inserted.
    pub injected: Vec<String>,
    /// Tables skipped by the load gate.
    pub skipped: Vec<String>,
    /// Tables whose load failed.
    pub failed: Vec<String>,
    /// Rows inserted per injected table, parallel to `injected`.
    pub rows: Vec<usize>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.rows.iter().sum()
    }

    /// Final outcome for `table`, if it was attempted.
    pub fn outcome_of(&self, table: &str) -> Option<LoadOutcome> {
        if self.injected.iter().any(|t| t == table) {
            Some(LoadOutcome::Loaded)
        } else if self.skipped.iter().any(|t| t == table) {
            Some(LoadOutcome::SkippedAlreadyLoaded)
        } else if self.failed.iter().any(|t| t == table) {
            Some(LoadOutcome::InsertionFailed)
        } else {
            None
        }
    }
}

/// Final classification of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutcome {
    pub table: String,
    pub outcome: LoadOutcome,
    /// Rows inserted in this run; zero unless `outcome` is `Loaded`.
    pub rows: usize,
}

/// Both stages of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub provision: ProvisionReport,
    /// `None` when loading was not requested.
    pub load: Option<LoadReport>,
}

impl RunReport {
    /// One entry per discovered table, created tables first, each in exactly one class.
    pub fn outcomes(&self) -> Vec<TableOutcome> {
        let mut outcomes = Vec::with_capacity(self.provision.total());
        for table in &self.provision.created {
            let (outcome, rows) = match &self.load {
                Some(load) => match load.outcome_of(table) {
                    Some(LoadOutcome::Loaded) => {
                        let rows = load
                            .injected
                            .iter()
                            .position(|t| t == table)
                            .and_then(|i| load.rows.get(i).copied())
                            .unwrap_or(0);
                        (LoadOutcome::Loaded, rows)
                    }
                    Some(outcome) => (outcome, 0),
                    None => (LoadOutcome::Created, 0),
                },
                None => (LoadOutcome::Created, 0),
            };
            outcomes.push(TableOutcome {
                table: table.clone(),
                outcome,
                rows,
            });
        }
        for table in &self.provision.failed {
            outcomes.push(TableOutcome {
                table: table.clone(),
                outcome: LoadOutcome::CreationFailed,
                rows: 0,
            });
        }
        outcomes
    }

    pub fn has_failures(&self) -> bool {
        !self.provision.failed.is_empty()
            || self.load.as_ref().is_some_and(|load| !load.failed.is_empty())
    }
}
