//! Name-indexed collection of all known table metadata.

use super::error::MetadataError;
use super::table::{Table, TableKind};
use std::collections::HashMap;

/// Holds every table definition a batch may need to look up by name.
///
/// Cross-table references (driving keys, role-playing parents) are checked as
/// soon as both ends are registered, in whichever order they arrive. A
/// reference to a table that was never registered is not a metadata problem;
/// plan construction reports it.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Result<Self, MetadataError> {
        let mut registry = Self::new();
        for table in tables {
            registry.register(table)?;
        }
        Ok(registry)
    }

    pub fn count(&self) -> usize {
        self.tables.len()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&idx| &self.tables[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Tables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn register(&mut self, table: Table) -> Result<(), MetadataError> {
        if self.by_name.contains_key(table.name()) {
            return Err(MetadataError::DuplicateTable { table: table.name().to_string() });
        }

        // Check the newcomer's own references, then everything that points at it.
        self.check_references(&table)?;
        for existing in &self.tables {
            if references(existing, table.name()) {
                check_against(existing, &table)?;
            }
        }

        self.by_name.insert(table.name().to_string(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Registers `table` unless the same definition is already present.
    /// Staging locations are not compared.
    pub(crate) fn register_or_confirm(&mut self, table: &Table) -> Result<(), MetadataError> {
        match self.get(table.name()) {
            Some(existing) if existing.same_definition(table) => Ok(()),
            Some(_) => Err(MetadataError::DuplicateTable { table: table.name().to_string() }),
            None => self.register(table.clone()),
        }
    }

    fn check_references(&self, table: &Table) -> Result<(), MetadataError> {
        let target = match table {
            Table::EffectivitySatellite(eff) => eff.satellite().parent_table_name(),
            Table::RolePlayingHub(rp) => rp.parent_table_name(),
            Table::RolePlayingLink(rp) => rp.parent_table_name(),
            _ => return Ok(()),
        };
        match self.get(target) {
            Some(parent) => check_against(table, parent),
            None => Ok(()),
        }
    }
}

fn references(table: &Table, name: &str) -> bool {
    match table {
        Table::EffectivitySatellite(eff) => eff.satellite().parent_table_name() == name,
        _ => table.role_playing_parent() == Some(name),
    }
}

/// Validates one cross-table reference of `table` against its resolved `parent`.
fn check_against(table: &Table, parent: &Table) -> Result<(), MetadataError> {
    match table {
        Table::EffectivitySatellite(eff) => {
            for key in eff.driving_keys() {
                if parent.core().field(&key.name).is_none() {
                    return Err(MetadataError::UnknownDrivingKey {
                        satellite: eff.name().to_string(),
                        parent: parent.name().to_string(),
                        field: key.name.clone(),
                    });
                }
            }
            Ok(())
        }
        Table::RolePlayingHub(_) => expect_kind(table, parent, TableKind::Hub),
        Table::RolePlayingLink(_) => expect_kind(table, parent, TableKind::Link),
        _ => Ok(()),
    }
}

fn expect_kind(table: &Table, parent: &Table, expected: TableKind) -> Result<(), MetadataError> {
    if parent.kind() == expected {
        Ok(())
    } else {
        Err(MetadataError::RolePlayingKind {
            table: table.name().to_string(),
            parent: parent.name().to_string(),
            found: parent.kind().to_string(),
            expected: expected.to_string(),
        })
    }
}
