//! Resolves the key-derivation rule of hubs, links and role-playing tables.

use crate::metadata::{Table, TableRegistry};
use crate::plan::{FieldSource, OrderingError};

/// How a table derives its hash key: which staged columns, at what width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRule {
    pub columns: Vec<String>,
    pub width: usize,
}

impl KeyRule {
    pub fn into_source(self) -> FieldSource {
        FieldSource::HashKey { columns: self.columns, width: self.width }
    }
}

/// Looks up key rules by table name through the registry.
///
/// Role-playing tables read their own business-key columns but hash them with
/// their parent's rule, so equal values give bit-identical keys in both.
pub struct KeyResolver<'a> {
    registry: &'a TableRegistry,
}

impl<'a> KeyResolver<'a> {
    pub fn new(registry: &'a TableRegistry) -> Self {
        Self { registry }
    }

    /// Rule of table `name`, as needed by `requester`.
    pub fn rule_for(&self, requester: &str, name: &str) -> Result<KeyRule, OrderingError> {
        let table = self.lookup(requester, name)?;
        self.rule_of(table)
    }

    pub fn rule_of(&self, table: &Table) -> Result<KeyRule, OrderingError> {
        if table.kind().is_satellite_like() {
            return Err(OrderingError::InvalidDependency {
                table: table.name().to_string(),
                dependency: table.name().to_string(),
                kind: table.kind(),
            });
        }
        let columns: Vec<String> = table.business_key().iter().map(|f| f.name.clone()).collect();

        match table.role_playing_parent() {
            None => Ok(KeyRule { columns, width: table.key_field().digest_width() }),
            Some(parent_name) => {
                let parent = self.lookup(table.name(), parent_name)?;
                let parent_rule = self.rule_of(parent)?;
                if parent_rule.columns.len() != columns.len() {
                    return Err(OrderingError::IncompatibleParent {
                        table: table.name().to_string(),
                        parent: parent_name.to_string(),
                        expected: parent_rule.columns.len(),
                        found: columns.len(),
                    });
                }
                Ok(KeyRule { columns, width: parent_rule.width })
            }
        }
    }

    pub fn lookup(&self, requester: &str, name: &str) -> Result<&'a Table, OrderingError> {
        self.registry.get(name).ok_or_else(|| OrderingError::UnknownParent {
            table: requester.to_string(),
            parent: name.to_string(),
        })
    }
}
