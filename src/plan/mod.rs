//! Load plans, their operations, and the dependency ordering of target tables.
pub mod error;
pub mod operation;
pub mod topology;

pub use error::{AmbiguousHistoryError, OrderingError};
pub use operation::{FieldMapping, FieldSource, Grouping, LoadOperation, LoadPlan, LoadRow, OperationKind, TableRef};
