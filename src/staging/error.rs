//! Defines the error type for problems with staged input.
use super::StagingLocation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingError {
    #[error("no staged rows are available for '{location}'")]
    MissingLocation { location: StagingLocation },
    #[error("staged row {row} for table '{table}' has no value for any of {columns:?}")]
    MissingBusinessKey { table: String, row: usize, columns: Vec<String> },
    #[error("staged row {row} for table '{table}' has a non-timestamp value in 'r_timestamp'")]
    InvalidRecordTimestamp { table: String, row: usize },
}
