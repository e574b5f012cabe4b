//! History generation for effectivity satellites, grouped by driving key.

use super::mapping::{MappedRow, TablePlan};
use super::satellite::chain;
use crate::metadata::HASHDIFF;
use crate::plan::{AmbiguousHistoryError, LoadOperation, OperationKind};
use chrono::NaiveDateTime;

/// Builds the close-and-insert operation of an effectivity satellite.
///
/// Groups are the driving-key values of the parent link, so one group can
/// move between link keys over time. A record's identity is therefore the
/// pair of link hash key and hashdiff: switching to another link key closes
/// the previous relationship even if the payload is unchanged.
#[tracing::instrument(level = "debug", skip_all, fields(table = %plan.table.name()))]
pub(crate) fn generate(
    plan: TablePlan<'_>,
    rows: Vec<MappedRow>,
    open_end: NaiveDateTime,
) -> Result<LoadOperation, AmbiguousHistoryError> {
    let mut identity = vec![0];
    identity.extend(plan.column_index(HASHDIFF));
    let chained = chain(&plan, rows, &identity, open_end)?;
    Ok(plan.into_operation(OperationKind::CloseAndInsert, chained))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadConfig;
    use crate::fixtures::*;
    use crate::generate::keys::KeyResolver;
    use crate::hashing::hash_key;
    use crate::metadata::{Table, TableRegistry};
    use crate::staging::{StagedRow, Value};
    use chrono::Duration;
    use rstest::rstest;

    fn operation(all_tables: Vec<Table>, config: &LoadConfig, staged: &[StagedRow]) -> Result<LoadOperation, AmbiguousHistoryError> {
        let registry = TableRegistry::from_tables(all_tables).unwrap();
        let table = registry.get("ls_order_customer_eff").unwrap();
        let plan = TablePlan::build(table, config.staging_location(), &KeyResolver::new(&registry)).unwrap();
        let mapped = plan.map_rows(staged, config).unwrap();
        generate(plan, mapped, config.open_end_timestamp)
    }

    #[rstest]
    fn test_new_link_key_supersedes_previous(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let t2 = t1 + Duration::days(1);
        let staged = [
            order_row("C1", "O1", "active").with("r_timestamp", t1),
            order_row("C1", "O2", "active").with("r_timestamp", t2),
        ];
        let op = operation(all_tables, &load_config, &staged).unwrap();

        assert_eq!(op.rows.len(), 2);
        assert!(op.rows.iter().all(|r| r.group.as_slice() == [hash_key(&["C1"])]));
        assert_eq!(op.value(&op.rows[0], "r_timestamp_end"), Some(&Value::Timestamp(t2)));
        assert_ne!(
            op.value(&op.rows[0], "l_order_customer_hashkey"),
            op.value(&op.rows[1], "l_order_customer_hashkey")
        );
    }

    #[rstest]
    fn test_same_relationship_collapses(all_tables: Vec<Table>, load_config: LoadConfig) {
        let t1 = load_config.record_timestamp();
        let staged = [
            order_row("C1", "O1", "active").with("r_timestamp", t1),
            order_row("C1", "O1", "active").with("r_timestamp", t1 + Duration::hours(1)),
            order_row("C2", "O1", "active").with("r_timestamp", t1),
        ];
        let op = operation(all_tables, &load_config, &staged).unwrap();
        assert_eq!(op.rows.len(), 2);
    }

    #[rstest]
    fn test_two_links_at_one_instant_are_ambiguous(all_tables: Vec<Table>, load_config: LoadConfig) {
        let staged = [order_row("C1", "O1", "active"), order_row("C1", "O2", "active")];
        let err = operation(all_tables, &load_config, &staged).unwrap_err();
        assert_eq!(err.key, [hash_key(&["C1"])]);
    }
}
