//! Per-table field mappings and their evaluation against staged rows.

use super::keys::KeyResolver;
use crate::config::LoadConfig;
use crate::hashing;
use crate::metadata::{
    Satellite, Table, HASHDIFF, RECORD_END_TIMESTAMP, RECORD_SOURCE, RECORD_START_TIMESTAMP,
};
use crate::plan::{FieldMapping, FieldSource, Grouping, LoadOperation, LoadRow, OperationKind, OrderingError, TableRef};
use crate::staging::{StagedRow, StagingError, StagingLocation, Value};
use chrono::NaiveDateTime;
use smallvec::SmallVec;

pub(crate) type GroupKey = SmallVec<[String; 2]>;

/// How the group key of a row is obtained.
#[derive(Debug, Clone)]
pub(crate) enum GroupBy {
    /// Read from an already-computed target column.
    Column(usize),
    /// Computed from the staged row; used for driving keys, which are not
    /// stored on the effectivity satellite itself.
    Derived(Vec<FieldSource>),
}

/// Everything needed to turn staged rows into target rows for one table.
#[derive(Debug, Clone)]
pub(crate) struct TablePlan<'t> {
    pub table: &'t Table,
    pub staging: StagingLocation,
    pub mapping: Vec<FieldMapping>,
    pub grouping: Grouping,
    pub group_by: GroupBy,
}

/// A staged row mapped onto the target layout.
#[derive(Debug, Clone)]
pub(crate) struct MappedRow {
    pub group: GroupKey,
    pub timestamp: NaiveDateTime,
    pub values: Vec<Value>,
}

impl<'t> TablePlan<'t> {
    pub fn build(table: &'t Table, staging: StagingLocation, resolver: &KeyResolver) -> Result<Self, OrderingError> {
        let mapping = mapping_for(table, resolver)?;
        let key_column = table.key_field().name.clone();

        let (grouping, group_by) = match table {
            Table::EffectivitySatellite(eff) => {
                let link_name = eff.satellite().parent_table_name();
                let link = resolver.lookup(table.name(), link_name)?;
                let link_mapping = mapping_for(link, resolver)?;
                let fields: Vec<String> = eff.driving_keys().iter().map(|k| k.name.clone()).collect();
                let sources = fields
                    .iter()
                    .map(|name| {
                        link_mapping
                            .iter()
                            .find(|m| &m.target == name)
                            .map(|m| m.source.clone())
                            .ok_or_else(|| OrderingError::UnknownParent {
                                table: table.name().to_string(),
                                parent: format!("{}.{}", link_name, name),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (
                    Grouping::DrivingKey { link: link_name.to_string(), fields },
                    GroupBy::Derived(sources),
                )
            }
            _ => (Grouping::Column { column: key_column }, GroupBy::Column(0)),
        };

        Ok(Self { table, staging, mapping, grouping, group_by })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.mapping.iter().position(|m| m.target == column)
    }

    /// Maps every staged row onto the target layout, in input order.
    pub fn map_rows(&self, rows: &[StagedRow], config: &LoadConfig) -> Result<Vec<MappedRow>, StagingError> {
        let default_ts = config.record_timestamp();
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                let timestamp = row.record_timestamp(default_ts).ok_or_else(|| {
                    StagingError::InvalidRecordTimestamp { table: self.table.name().to_string(), row: index }
                })?;
                let ctx = RowContext { table: self.table.name(), index, row, timestamp, config };
                let values = self
                    .mapping
                    .iter()
                    .map(|m| ctx.evaluate(&m.source))
                    .collect::<Result<Vec<_>, _>>()?;
                let group = match &self.group_by {
                    GroupBy::Column(i) => std::iter::once(key_text(&values[*i])).collect(),
                    GroupBy::Derived(sources) => sources
                        .iter()
                        .map(|s| ctx.evaluate(s).map(|v| key_text(&v)))
                        .collect::<Result<GroupKey, _>>()?,
                };
                Ok(MappedRow { group, timestamp, values })
            })
            .collect()
    }

    pub fn into_operation(self, kind: OperationKind, rows: Vec<LoadRow>) -> LoadOperation {
        LoadOperation {
            target: TableRef {
                schema: self.table.schema().to_string(),
                name: self.table.name().to_string(),
            },
            table_kind: self.table.kind(),
            kind,
            staging: self.staging,
            grouping: self.grouping,
            mapping: self.mapping,
            rows,
        }
    }
}

pub(crate) fn key_text(value: &Value) -> String {
    value.canonical().unwrap_or_default()
}

fn satellite_of(table: &Table) -> Option<&Satellite> {
    match table {
        Table::Satellite(sat) => Some(sat),
        Table::EffectivitySatellite(eff) => Some(eff.satellite()),
        _ => None,
    }
}

/// Derives the source of every column of `table`, in position order.
pub(crate) fn mapping_for(table: &Table, resolver: &KeyResolver) -> Result<Vec<FieldMapping>, OrderingError> {
    let satellite = satellite_of(table);
    table
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let source = match (field.name.as_str(), satellite) {
                (RECORD_START_TIMESTAMP, _) => FieldSource::RecordTimestamp,
                (RECORD_END_TIMESTAMP, Some(_)) => FieldSource::RecordEndTimestamp,
                (RECORD_SOURCE, _) => FieldSource::RecordSource,
                (HASHDIFF, Some(sat)) => FieldSource::HashDiff {
                    columns: sat.hashdiff_fields().map(|f| f.name.clone()).collect(),
                    width: field.digest_width(),
                },
                // A hub or link's own key
                (_, None) if i == 0 => resolver.rule_of(table)?.into_source(),
                _ => match field.referenced_table() {
                    Some(referenced) => resolver.rule_for(table.name(), referenced)?.into_source(),
                    None => FieldSource::Staged { column: field.name.clone() },
                },
            };
            Ok(FieldMapping { target: field.name.clone(), source })
        })
        .collect()
}

struct RowContext<'a> {
    table: &'a str,
    index: usize,
    row: &'a StagedRow,
    timestamp: NaiveDateTime,
    config: &'a LoadConfig,
}

impl RowContext<'_> {
    fn evaluate(&self, source: &FieldSource) -> Result<Value, StagingError> {
        match source {
            FieldSource::HashKey { columns, width } => {
                let values: Vec<Value> = columns.iter().map(|c| self.row.value(c)).collect();
                if values.iter().all(Value::is_null) {
                    return Err(StagingError::MissingBusinessKey {
                        table: self.table.to_string(),
                        row: self.index,
                        columns: columns.clone(),
                    });
                }
                Ok(Value::Text(hashing::digest_values(&values, *width)))
            }
            FieldSource::HashDiff { columns, width } => {
                let values: Vec<Value> = columns.iter().map(|c| self.row.value(c)).collect();
                Ok(Value::Text(hashing::digest_values(&values, *width)))
            }
            FieldSource::Staged { column } => Ok(self.row.value(column)),
            FieldSource::RecordTimestamp => Ok(Value::Timestamp(self.timestamp)),
            // History chaining replaces this for superseded rows.
            FieldSource::RecordEndTimestamp => Ok(Value::Timestamp(self.config.open_end_timestamp)),
            FieldSource::RecordSource => Ok(Value::Text(self.config.source.clone())),
        }
    }
}
