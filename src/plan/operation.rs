//! Defines the load plan: an ordered list of per-table operations.

use crate::metadata::TableKind;
use crate::staging::{StagingLocation, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// How an operation changes its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Add rows whose group key is absent from the target; never update.
    InsertOnly,
    /// Per group: close the open record if the content changed, then insert
    /// the new history.
    CloseAndInsert,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::InsertOnly => f.write_str("insert-only"),
            OperationKind::CloseAndInsert => f.write_str("close-and-insert"),
        }
    }
}

/// A table, by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Where the value of one target column comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FieldSource {
    /// Digest of the named staged columns; the key of a hub or link.
    HashKey { columns: Vec<String>, width: usize },
    /// Digest of the named staged columns; content fingerprint of a satellite row.
    HashDiff { columns: Vec<String>, width: usize },
    /// Copied from the staged column of the same or another name.
    Staged { column: String },
    /// The staged row's `r_timestamp`, else the batch extraction timestamp.
    RecordTimestamp,
    /// Successor's `r_timestamp`, or the open sentinel for the latest record.
    RecordEndTimestamp,
    /// The batch's source tag.
    RecordSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub target: String,
    pub source: FieldSource,
}

/// What identifies "the same thing" across rows of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Grouping {
    /// The value of a hash-key column: the row's own key for hubs and links,
    /// the parent's key for satellites.
    Column { column: String },
    /// Driving-key values of the parent link; used by effectivity satellites.
    DrivingKey { link: String, fields: Vec<String> },
}

/// One computed target row, tagged with its group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRow {
    pub group: SmallVec<[String; 2]>,
    /// Values in target column order.
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOperation {
    pub target: TableRef,
    pub table_kind: TableKind,
    pub kind: OperationKind,
    pub staging: StagingLocation,
    pub grouping: Grouping,
    /// One entry per target column, in position order.
    pub mapping: Vec<FieldMapping>,
    pub rows: Vec<LoadRow>,
}

impl LoadOperation {
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.mapping.iter().map(|m| m.target.as_str())
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.mapping.iter().position(|m| m.target == column)
    }

    pub fn value<'r>(&self, row: &'r LoadRow, column: &str) -> Option<&'r Value> {
        self.column_index(column).and_then(|i| row.values.get(i))
    }
}

/// The ordered operations of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPlan {
    pub source: String,
    pub extract_start_timestamp: NaiveDateTime,
    pub open_end_timestamp: NaiveDateTime,
    pub staging: StagingLocation,
    /// Source table of the staged batch.
    pub extract: TableRef,
    pub operations: Vec<LoadOperation>,
}

impl LoadPlan {
    pub fn operation(&self, table: &str) -> Option<&LoadOperation> {
        self.operations.iter().find(|op| op.target.name == table)
    }

    pub fn row_count(&self) -> usize {
        self.operations.iter().map(|op| op.rows.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
