//! The crate-level error type.
use crate::execution::ExecutionError;
use crate::metadata::MetadataError;
use crate::plan::{AmbiguousHistoryError, OrderingError};
use crate::staging::StagingError;

/// Crate-level error: anything that aborts building or handing off a plan.
///
/// No partial plan is ever returned alongside one of these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    AmbiguousHistory(#[from] AmbiguousHistoryError),

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
