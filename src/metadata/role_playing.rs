//! Role-playing tables: independently named hubs and links that borrow the
//! key-derivation rule of a designated parent.
//!
//! The parent is held by name only and resolved through the registry when a
//! plan is built.

use super::error::MetadataError;
use super::field::Field;
use super::hub::Hub;
use super::link::Link;
use super::table::TableDefinition;
use crate::staging::StagingLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct RolePlayingHub {
    hub: Hub,
    parent_table_name: String,
}

impl RolePlayingHub {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<Field>,
        parent_table_name: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            hub: Hub::new(schema, name, fields)?,
            parent_table_name: parent_table_name.into(),
        })
    }

    pub fn with_staging(mut self, location: StagingLocation) -> Self {
        self.hub = self.hub.with_staging(location);
        self
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn parent_table_name(&self) -> &str {
        &self.parent_table_name
    }
}

impl TryFrom<TableDefinition> for RolePlayingHub {
    type Error = MetadataError;

    fn try_from(mut def: TableDefinition) -> Result<Self, Self::Error> {
        let parent = def
            .parent_table_name
            .take()
            .ok_or_else(|| MetadataError::MissingParent { table: def.name.clone() })?;
        Ok(Self { hub: Hub::try_from(def)?, parent_table_name: parent })
    }
}

impl From<RolePlayingHub> for TableDefinition {
    fn from(rp: RolePlayingHub) -> Self {
        let mut def = TableDefinition::from(rp.hub);
        def.parent_table_name = Some(rp.parent_table_name);
        def
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct RolePlayingLink {
    link: Link,
    parent_table_name: String,
}

impl RolePlayingLink {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<Field>,
        parent_table_name: impl Into<String>,
    ) -> Result<Self, MetadataError> {
        Ok(Self {
            link: Link::new(schema, name, fields)?,
            parent_table_name: parent_table_name.into(),
        })
    }

    pub fn with_staging(mut self, location: StagingLocation) -> Self {
        self.link = self.link.with_staging(location);
        self
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn parent_table_name(&self) -> &str {
        &self.parent_table_name
    }
}

impl TryFrom<TableDefinition> for RolePlayingLink {
    type Error = MetadataError;

    fn try_from(mut def: TableDefinition) -> Result<Self, Self::Error> {
        let parent = def
            .parent_table_name
            .take()
            .ok_or_else(|| MetadataError::MissingParent { table: def.name.clone() })?;
        Ok(Self { link: Link::try_from(def)?, parent_table_name: parent })
    }
}

impl From<RolePlayingLink> for TableDefinition {
    fn from(rp: RolePlayingLink) -> Self {
        let mut def = TableDefinition::from(rp.link);
        def.parent_table_name = Some(rp.parent_table_name);
        def
    }
}
