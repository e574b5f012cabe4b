//! Staged batch input: locations, rows, values and the provider seam.
//!
//! The core never extracts anything itself. A `StagingProvider` hands over
//! the rows of one batch, already materialized, addressed by
//! `(staging_schema, staging_table)`.

pub mod error;
pub mod value;

pub use error::StagingError;
pub use value::Value;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Where a table's staged rows live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StagingLocation {
    pub schema: String,
    pub table: String,
}

impl StagingLocation {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self { schema: schema.into(), table: table.into() }
    }
}

impl fmt::Display for StagingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// One row of the staged extract, addressed by column name.
///
/// Absent columns read as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagedRow {
    columns: BTreeMap<String, Value>,
}

impl StagedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// The row's value for `column`, null when absent.
    pub fn value(&self, column: &str) -> Value {
        self.columns.get(column).cloned().unwrap_or_default()
    }

    /// The row's own `r_timestamp` if it carries one, else `default`.
    pub fn record_timestamp(&self, default: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.columns.get(crate::metadata::RECORD_START_TIMESTAMP) {
            None | Some(Value::Null) => Some(default),
            Some(v) => v.as_timestamp(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for StagedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Supplies the staged rows of the current batch.
///
/// Implementations must be shareable across threads: operations for distinct
/// tables may be generated in parallel.
pub trait StagingProvider: Sync {
    fn staged_rows(&self, location: &StagingLocation) -> Result<&[StagedRow], StagingError>;
}

/// In-memory staging area, one row set per location.
#[derive(Debug, Clone, Default)]
pub struct MemoryStaging {
    batches: HashMap<StagingLocation, Vec<StagedRow>>,
}

impl MemoryStaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: StagingLocation, rows: Vec<StagedRow>) {
        self.batches.insert(location, rows);
    }

    pub fn with_rows(mut self, location: StagingLocation, rows: Vec<StagedRow>) -> Self {
        self.insert(location, rows);
        self
    }
}

impl StagingProvider for MemoryStaging {
    fn staged_rows(&self, location: &StagingLocation) -> Result<&[StagedRow], StagingError> {
        self.batches
            .get(location)
            .map(Vec::as_slice)
            .ok_or_else(|| StagingError::MissingLocation { location: location.clone() })
    }
}
