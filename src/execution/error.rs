//! Defines the error type raised while applying a plan.
use thiserror::Error;

/// A plan the target cannot apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("operation for '{table}' has columns {found:?}, but the table was created with {expected:?}")]
    LayoutMismatch { table: String, expected: Vec<String>, found: Vec<String> },
    #[error("row {row} of the operation for '{table}' has {found} values; its mapping has {expected} columns")]
    RowWidth { table: String, row: usize, expected: usize, found: usize },
    #[error("operation for '{table}' has no '{column}' column")]
    MissingColumn { table: String, column: String },
}
