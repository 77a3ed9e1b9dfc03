use std::fmt;

use crate::replication::{MetadataError, ResourceAddress};

/// Why a table never reached the import loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    QueryFailed(String),
    InvalidMetadata(MetadataError),
    DuplicateLogicalId(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "table does not exist, create the table first"),
            SkipReason::QueryFailed(message) => write!(f, "metadata query failed: {}", message),
            SkipReason::InvalidMetadata(error) => write!(f, "invalid metadata: {}", error),
            SkipReason::DuplicateLogicalId(id) => {
                write!(f, "logical id '{}' is already used by another table", id)
            }
        }
    }
}

/// What happened to one table during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Imported(ResourceAddress),
    AlreadyManaged(ResourceAddress),
    Skipped(SkipReason),
    ImportFailed(String),
}

impl Outcome {
    /// Returns true if the table ended the run under management.
    pub fn is_managed(&self) -> bool {
        matches!(self, Outcome::Imported(_) | Outcome::AlreadyManaged(_))
    }
}

/// Outcome for a named table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table_name: String,
    pub outcome: Outcome,
}

impl TableOutcome {
    pub fn new(table_name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            table_name: table_name.into(),
            outcome,
        }
    }
}

/// Ordered per-table outcomes of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    outcomes: Vec<TableOutcome>,
}

impl RunReport {
    /// Combines planning skips and reconcile outcomes, ordered as `table_order`.
    ///
    /// Tables missing from `table_order` keep their relative order at the end.
    pub fn assemble(
        table_order: &[String],
        skipped: Vec<TableOutcome>,
        reconciled: Vec<TableOutcome>,
    ) -> Self {
        let mut outcomes: Vec<TableOutcome> = skipped.into_iter().chain(reconciled).collect();
        outcomes.sort_by_key(|o| {
            table_order
                .iter()
                .position(|name| name == &o.table_name)
                .unwrap_or(usize::MAX)
        });
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[TableOutcome] {
        &self.outcomes
    }

    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Imported(_)))
    }

    pub fn already_managed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::AlreadyManaged(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::ImportFailed(_)))
    }

    /// True when every table ended the run under management.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.outcome.is_managed())
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }
}

/// Pure function: format a report for display, one line per table plus a summary.
pub fn format_report(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes()
        .iter()
        .map(|o| match &o.outcome {
            Outcome::Imported(address) => format!("+ {}: imported as {}", o.table_name, address),
            Outcome::AlreadyManaged(address) => {
                format!("= {}: already managed as {}", o.table_name, address)
            }
            Outcome::Skipped(reason) => format!("~ {}: skipped, {}", o.table_name, reason),
            Outcome::ImportFailed(message) => {
                format!("- {}: import failed, {}", o.table_name, message)
            }
        })
        .collect();

    lines.push(format!(
        "{} imported, {} already managed, {} skipped, {} failed",
        report.imported(),
        report.already_managed(),
        report.skipped(),
        report.failed()
    ));
    lines
}
