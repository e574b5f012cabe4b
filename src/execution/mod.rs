//! Hand-off of finished plans, and an in-memory target that applies them.
//!
//! `MemoryTarget` is not a database. It keeps every table as a vector of rows
//! and applies each operation with exactly the semantics its kind promises,
//! which makes re-running a batch observable in tests.
pub mod error;

pub use error::ExecutionError;

use crate::metadata::{HASHDIFF, RECORD_END_TIMESTAMP, RECORD_START_TIMESTAMP};
use crate::plan::{Grouping, LoadOperation, LoadPlan, LoadRow, OperationKind, TableRef};
use crate::staging::Value;
use chrono::NaiveDateTime;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashSet};

/// Receives a finished plan. Implemented by whatever executes statements.
pub trait PlanExecutor {
    fn apply(&mut self, plan: &LoadPlan) -> Result<ExecutionReport, ExecutionError>;
}

/// Per-operation outcome of one `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOperation {
    pub target: TableRef,
    pub kind: OperationKind,
    pub inserted: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub operations: Vec<AppliedOperation>,
}

impl ExecutionReport {
    pub fn inserted(&self) -> usize {
        self.operations.iter().map(|o| o.inserted).sum()
    }

    pub fn closed(&self) -> usize {
        self.operations.iter().map(|o| o.closed).sum()
    }

    pub fn for_table(&self, name: &str) -> Option<&AppliedOperation> {
        self.operations.iter().find(|o| o.target.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub group: SmallVec<[String; 2]>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default)]
struct TargetTable {
    columns: Vec<String>,
    rows: Vec<StoredRow>,
    keys: HashSet<SmallVec<[String; 2]>>,
}

/// Column positions an operation's rows are read through.
struct Layout {
    start: usize,
    end: usize,
    identity: SmallVec<[usize; 2]>,
}

impl Layout {
    fn of(op: &LoadOperation) -> Result<Self, ExecutionError> {
        let column = |name: &str| {
            op.column_index(name).ok_or_else(|| ExecutionError::MissingColumn {
                table: op.target.to_string(),
                column: name.to_string(),
            })
        };
        let hashdiff = column(HASHDIFF)?;
        let identity = match op.grouping {
            Grouping::Column { .. } => SmallVec::from_slice(&[hashdiff]),
            Grouping::DrivingKey { .. } => SmallVec::from_slice(&[0, hashdiff]),
        };
        Ok(Self { start: column(RECORD_START_TIMESTAMP)?, end: column(RECORD_END_TIMESTAMP)?, identity })
    }

    fn timestamp(&self, values: &[Value], column: usize) -> Option<NaiveDateTime> {
        values.get(column).and_then(Value::as_timestamp)
    }

    fn same(&self, a: &[Value], b: &[Value]) -> bool {
        self.identity.iter().all(|&i| a.get(i) == b.get(i))
    }
}

/// Tables held in memory, keyed by `schema.name`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    tables: BTreeMap<TableRef, TargetTable>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &TableRef) -> &[StoredRow] {
        self.tables.get(table).map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    pub fn count(&self, table: &TableRef) -> usize {
        self.rows(table).len()
    }

    pub fn columns(&self, table: &TableRef) -> &[String] {
        self.tables.get(table).map(|t| t.columns.as_slice()).unwrap_or(&[])
    }

    /// Rows whose `r_timestamp_end` equals `open_end`.
    pub fn open_rows(&self, table: &TableRef, open_end: NaiveDateTime) -> Vec<&StoredRow> {
        let Some(t) = self.tables.get(table) else { return Vec::new() };
        let Some(end) = t.columns.iter().position(|c| c == RECORD_END_TIMESTAMP) else {
            return Vec::new();
        };
        t.rows
            .iter()
            .filter(|r| r.values.get(end).and_then(Value::as_timestamp) == Some(open_end))
            .collect()
    }

    /// The value of `column` in `row`, read through the table's layout.
    pub fn value<'r>(&self, table: &TableRef, row: &'r StoredRow, column: &str) -> Option<&'r Value> {
        let index = self.columns(table).iter().position(|c| c == column)?;
        row.values.get(index)
    }

    fn table_for(&mut self, op: &LoadOperation) -> Result<&mut TargetTable, ExecutionError> {
        let columns: Vec<String> = op.columns().map(str::to_string).collect();
        if let Some((row, found)) = op
            .rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != columns.len())
            .map(|(i, r)| (i, r.values.len()))
        {
            return Err(ExecutionError::RowWidth {
                table: op.target.to_string(),
                row,
                expected: columns.len(),
                found,
            });
        }
        let table = self.tables.entry(op.target.clone()).or_insert_with(|| TargetTable {
            columns: columns.clone(),
            ..Default::default()
        });
        if table.columns != columns {
            return Err(ExecutionError::LayoutMismatch {
                table: op.target.to_string(),
                expected: table.columns.clone(),
                found: columns,
            });
        }
        Ok(table)
    }

    fn insert_only(&mut self, op: &LoadOperation) -> Result<AppliedOperation, ExecutionError> {
        let table = self.table_for(op)?;
        let mut inserted = 0;
        for row in &op.rows {
            if table.keys.insert(row.group.clone()) {
                table.rows.push(StoredRow { group: row.group.clone(), values: row.values.clone() });
                inserted += 1;
            }
        }
        Ok(AppliedOperation { target: op.target.clone(), kind: op.kind, inserted, closed: 0 })
    }

    fn close_and_insert(&mut self, op: &LoadOperation, open_end: NaiveDateTime) -> Result<AppliedOperation, ExecutionError> {
        let layout = Layout::of(op)?;
        let table = self.table_for(op)?;
        let (mut inserted, mut closed) = (0, 0);

        // Rows of one group are contiguous and ascending within an operation.
        let mut next = 0;
        while next < op.rows.len() {
            let group = &op.rows[next].group;
            let len = op.rows[next..].iter().take_while(|r| &r.group == group).count();
            let batch = &op.rows[next..next + len];
            next += len;

            let current = table
                .rows
                .iter()
                .enumerate()
                .filter(|(_, r)| &r.group == group)
                .max_by_key(|(_, r)| layout.timestamp(&r.values, layout.start))
                .map(|(i, r)| (i, layout.timestamp(&r.values, layout.start)));

            let fresh: Vec<&LoadRow> = match current {
                Some((_, since)) => batch
                    .iter()
                    .filter(|r| layout.timestamp(&r.values, layout.start) > since)
                    .collect(),
                None => batch.iter().collect(),
            };
            let Some(first) = fresh.first() else { continue };

            let mut remaining = fresh.as_slice();
            if let Some((i, _)) = current {
                let open = &mut table.rows[i];
                let is_open = layout.timestamp(&open.values, layout.end) == Some(open_end);
                if layout.same(&open.values, &first.values) {
                    open.values[layout.end] = first.values[layout.end].clone();
                    remaining = &fresh[1..];
                } else if is_open {
                    open.values[layout.end] = first.values[layout.start].clone();
                    closed += 1;
                }
            }

            for row in remaining {
                table.rows.push(StoredRow { group: row.group.clone(), values: row.values.clone() });
                inserted += 1;
            }
        }
        Ok(AppliedOperation { target: op.target.clone(), kind: op.kind, inserted, closed })
    }
}

impl PlanExecutor for MemoryTarget {
    #[tracing::instrument(level = "debug", skip_all, fields(operations = plan.operations.len()))]
    fn apply(&mut self, plan: &LoadPlan) -> Result<ExecutionReport, ExecutionError> {
        let mut report = ExecutionReport::default();
        for op in &plan.operations {
            let applied = match op.kind {
                OperationKind::InsertOnly => self.insert_only(op)?,
                OperationKind::CloseAndInsert => self.close_and_insert(op, plan.open_end_timestamp)?,
            };
            tracing::debug!(
                table = %applied.target,
                inserted = applied.inserted,
                closed = applied.closed,
                "applied operation"
            );
            report.operations.push(applied);
        }
        Ok(report)
    }
}
