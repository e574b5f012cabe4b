//! Defines the error types raised while building a load plan.
use crate::metadata::TableKind;
use chrono::NaiveDateTime;
use thiserror::Error;

/// The target-table set cannot be put into a valid load order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("table '{table}' is targeted more than once")]
    DuplicateTarget { table: String },
    #[error("table '{table}' depends on '{dependency}', which is not part of the load")]
    MissingDependency { table: String, dependency: String },
    #[error("table '{table}' cannot depend on '{dependency}' ({kind})")]
    InvalidDependency { table: String, dependency: String, kind: TableKind },
    #[error("table '{table}' refers to unknown table '{parent}'")]
    UnknownParent { table: String, parent: String },
    #[error("table '{table}' has {found} business key field(s); its parent '{parent}' has {expected}")]
    IncompatibleParent { table: String, parent: String, expected: usize, found: usize },
    #[error("cycle detected among tables {tables:?}")]
    Cycle { tables: Vec<String> },
}

/// Two staged rows for one history group share a timestamp but not content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("table '{table}' received conflicting rows for key {key:?} at {timestamp}")]
pub struct AmbiguousHistoryError {
    pub table: String,
    pub key: Vec<String>,
    pub timestamp: NaiveDateTime,
}
