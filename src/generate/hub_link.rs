//! Insert-only generation for hubs, links and role-playing tables.

use super::mapping::{GroupKey, MappedRow, TablePlan};
use crate::plan::{LoadOperation, LoadRow, OperationKind};
use std::collections::HashMap;

/// Builds the insert-only operation of a hub, link or role-playing table.
///
/// One row survives per hash key: the most recent `r_timestamp` wins, and
/// between equal timestamps the earliest staged row. Surviving rows keep the
/// order in which their key first appeared.
#[tracing::instrument(level = "debug", skip_all, fields(table = %plan.table.name()))]
pub(crate) fn generate(plan: TablePlan<'_>, rows: Vec<MappedRow>) -> LoadOperation {
    let staged = rows.len();
    let mut slots: HashMap<GroupKey, usize> = HashMap::with_capacity(staged);
    let mut kept: Vec<MappedRow> = Vec::with_capacity(staged);

    for row in rows {
        match slots.get(&row.group) {
            Some(&slot) => {
                if row.timestamp > kept[slot].timestamp {
                    kept[slot] = row;
                }
            }
            None => {
                slots.insert(row.group.clone(), kept.len());
                kept.push(row);
            }
        }
    }

    tracing::debug!(staged, unique = kept.len(), "deduplicated staged rows");

    let rows = kept
        .into_iter()
        .map(|r| LoadRow { group: r.group, values: r.values })
        .collect();
    plan.into_operation(OperationKind::InsertOnly, rows)
}
