//! Type-2 history generation for satellites: ordering, collapsing and chaining
//! of staged versions per parent key.

use super::mapping::{GroupKey, MappedRow, TablePlan};
use crate::metadata::{HASHDIFF, RECORD_END_TIMESTAMP};
use crate::plan::{AmbiguousHistoryError, LoadOperation, LoadRow, OperationKind};
use crate::staging::Value;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Builds the close-and-insert operation of a plain satellite.
///
/// Rows are grouped by the parent hash key and a record's identity is its
/// hashdiff.
#[tracing::instrument(level = "debug", skip_all, fields(table = %plan.table.name()))]
pub(crate) fn generate(
    plan: TablePlan<'_>,
    rows: Vec<MappedRow>,
    open_end: NaiveDateTime,
) -> Result<LoadOperation, AmbiguousHistoryError> {
    let identity: Vec<usize> = plan.column_index(HASHDIFF).into_iter().collect();
    let chained = chain(&plan, rows, &identity, open_end)?;
    Ok(plan.into_operation(OperationKind::CloseAndInsert, chained))
}

/// Orders each group's rows into a gap-free history.
///
/// Within a group rows are sorted by `r_timestamp` (stable). Rows equal in
/// identity to their predecessor are folded into it. Each kept row ends where
/// the next one starts and the last stays open. Groups are emitted in the
/// order they first appear in the batch.
pub(crate) fn chain(
    plan: &TablePlan<'_>,
    rows: Vec<MappedRow>,
    identity: &[usize],
    open_end: NaiveDateTime,
) -> Result<Vec<LoadRow>, AmbiguousHistoryError> {
    let end_column = plan.column_index(RECORD_END_TIMESTAMP);
    let same = |a: &MappedRow, b: &MappedRow| identity.iter().all(|&i| a.values[i] == b.values[i]);

    let mut order: Vec<GroupKey> = Vec::new();
    let mut groups: HashMap<GroupKey, Vec<MappedRow>> = HashMap::new();
    for row in rows {
        groups
            .entry(row.group.clone())
            .or_insert_with(|| {
                order.push(row.group.clone());
                Vec::new()
            })
            .push(row);
    }

    let mut chained = Vec::new();
    for key in order {
        let Some(mut history) = groups.remove(&key) else { continue };
        history.sort_by_key(|r| r.timestamp);

        let mut kept: Vec<MappedRow> = Vec::with_capacity(history.len());
        let mut previous: Option<&MappedRow> = None;
        for row in &history {
            if let Some(prev) = previous {
                if prev.timestamp == row.timestamp {
                    if !same(prev, row) {
                        return Err(AmbiguousHistoryError {
                            table: plan.table.name().to_string(),
                            key: key.to_vec(),
                            timestamp: row.timestamp,
                        });
                    }
                    tracing::warn!(
                        table = plan.table.name(),
                        timestamp = %row.timestamp,
                        "dropping duplicate staged row"
                    );
                    continue;
                }
            }
            previous = Some(row);
            if kept.last().map_or(true, |last| !same(last, row)) {
                kept.push(row.clone());
            }
        }

        let starts: Vec<NaiveDateTime> = kept.iter().skip(1).map(|r| r.timestamp).collect();
        for (i, row) in kept.into_iter().enumerate() {
            let mut values = row.values;
            if let Some(column) = end_column {
                values[column] = Value::Timestamp(starts.get(i).copied().unwrap_or(open_end));
            }
            chained.push(LoadRow { group: row.group, values });
        }
    }
    Ok(chained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadConfig;
    use crate::fixtures::*;
    use crate::generate::keys::KeyResolver;
    use crate::metadata::{Table, TableRegistry};
    use crate::staging::StagedRow;
    use chrono::Duration;
    use rstest::rstest;

    fn operation(all_tables: Vec<Table>, config: &LoadConfig, staged: &[StagedRow]) -> Result<LoadOperation, AmbiguousHistoryError> {
        let registry = TableRegistry::from_tables(all_tables).unwrap();
        let table = registry.get("hs_customer").unwrap();
        let plan = TablePlan::build(table, config.staging_location(), &KeyResolver::new(&registry)).unwrap();
        let mapped = plan.map_rows(staged, config).unwrap();
        generate(plan, mapped, config.open_end_timestamp)
    }

    fn customer_at(id: &str, text: &str, at: NaiveDateTime) -> StagedRow {
        StagedRow::new()
            .with("customer_id", id)
            .with("test_string", text)
            .with("r_timestamp", at)
    }

    #[rstest]
    fn test_history_is_chained_in_batch(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let t2 = t1 + Duration::hours(1);
        // Staged out of order on purpose
        let staged = [customer_at("C1", "b", t2), customer_at("C1", "a", t1)];
        let op = operation(all_tables, &load_config, &staged).unwrap();

        assert_eq!(op.kind, OperationKind::CloseAndInsert);
        assert_eq!(op.rows.len(), 2);
        assert_eq!(op.value(&op.rows[0], "test_string"), Some(&Value::from("a")));
        assert_eq!(op.value(&op.rows[0], "r_timestamp_end"), Some(&Value::Timestamp(t2)));
        assert_eq!(op.value(&op.rows[1], "test_string"), Some(&Value::from("b")));
        assert_eq!(
            op.value(&op.rows[1], "r_timestamp_end"),
            Some(&Value::Timestamp(load_config.open_end_timestamp))
        );
    }

    #[rstest]
    fn test_unchanged_content_collapses(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let staged = [
            customer_at("C1", "a", t1),
            customer_at("C1", "a", t1 + Duration::hours(1)),
            customer_at("C1", "b", t1 + Duration::hours(2)),
            customer_at("C1", "b", t1 + Duration::hours(3)),
        ];
        let op = operation(all_tables, &load_config, &staged).unwrap();

        let starts: Vec<_> = op.rows.iter().map(|r| op.value(r, "r_timestamp").cloned()).collect();
        assert_eq!(
            starts,
            [Some(Value::Timestamp(t1)), Some(Value::Timestamp(t1 + Duration::hours(2)))]
        );
    }

    #[rstest]
    fn test_diagnostic_fields_do_not_change_content(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let staged = [
            customer_at("C1", "a", t1).with("x_customer_id", "first"),
            customer_at("C1", "a", t1 + Duration::hours(1)).with("x_customer_id", "second"),
        ];
        let op = operation(all_tables, &load_config, &staged).unwrap();
        assert_eq!(op.rows.len(), 1);
    }

    #[rstest]
    fn test_same_timestamp_conflict_is_ambiguous(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let staged = [customer_at("C1", "a", t1), customer_at("C1", "b", t1)];
        let err = operation(all_tables, &load_config, &staged).unwrap_err();

        assert_eq!(err.table, "hs_customer");
        assert_eq!(err.key, [crate::hashing::hash_key(&["C1"])]);
        assert_eq!(err.timestamp, t1);
    }

    #[rstest]
    fn test_conflict_behind_a_collapsed_row_is_found(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let t2 = t1 + Duration::hours(1);
        let staged = [customer_at("C1", "a", t1), customer_at("C1", "a", t2), customer_at("C1", "b", t2)];
        assert!(operation(all_tables, &load_config, &staged).is_err());
    }

    #[rstest]
    fn test_same_timestamp_duplicate_is_dropped(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let staged = [customer_at("C1", "a", t1), customer_at("C1", "a", t1), customer_at("C2", "a", t1)];
        let op = operation(all_tables, &load_config, &staged).unwrap();
        assert_eq!(op.rows.len(), 2);
    }
}
