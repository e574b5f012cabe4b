//! Link metadata: one row per unique combination of business keys.

use super::error::MetadataError;
use super::field::Field;
use super::rules::layout;
use super::table::{TableCore, TableDefinition};
use super::{HASHKEY_SUFFIX, RECORD_SOURCE, RECORD_START_TIMESTAMP};
use crate::staging::StagingLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct Link {
    core: TableCore,
}

impl Link {
    /// Builds a link, validating its layout.
    ///
    /// Besides its own `<name>_hashkey` at position 1, a link stores the hash
    /// key of every hub it connects (`<hub>_hashkey`, at least two), the
    /// relationship's business keys (including `ck_` child keys), optional
    /// `x_` diagnostic fields and the load metadata.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Result<Self, MetadataError> {
        let name = name.into();
        let core = TableCore::new(schema.into(), name.clone(), fields)?;
        let expected_key = format!("{}{}", name, HASHKEY_SUFFIX);
        layout::check_key_field(&name, core.fields(), Some(&expected_key))?;
        layout::require(&name, core.fields(), RECORD_START_TIMESTAMP)?;
        layout::require(&name, core.fields(), RECORD_SOURCE)?;

        let link = Self { core };
        let mut hubs = 0;
        for hub_key in link.hub_references() {
            layout::check_digest_field(&name, hub_key)?;
            hubs += 1;
        }
        if hubs < 2 {
            return Err(MetadataError::TooFewHubs { table: name, found: hubs });
        }
        if link.business_key().next().is_none() {
            return Err(MetadataError::NoBusinessKey { table: name });
        }
        Ok(link)
    }

    pub fn with_staging(mut self, location: StagingLocation) -> Self {
        self.core.set_staging(location);
        self
    }

    pub fn core(&self) -> &TableCore {
        &self.core
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn hashkey_field(&self) -> &Field {
        self.core.key_field()
    }

    /// Hash-key fields of the connected hubs, in position order.
    pub fn hub_references(&self) -> impl Iterator<Item = &Field> {
        self.core.fields()[1..].iter().filter(|f| f.is_hashkey())
    }

    pub fn hub_names(&self) -> impl Iterator<Item = &str> {
        self.hub_references().filter_map(|f| f.referenced_table())
    }

    /// Relationship business keys, child keys included; these make up the
    /// link's own hash key.
    pub fn business_key(&self) -> impl Iterator<Item = &Field> {
        self.core.fields()[1..]
            .iter()
            .filter(|f| !f.is_hashkey() && !f.is_record_metadata() && !f.is_diagnostic())
    }

    pub fn child_keys(&self) -> impl Iterator<Item = &Field> {
        self.business_key().filter(|f| f.is_child_key())
    }

    pub fn diagnostic_fields(&self) -> impl Iterator<Item = &Field> {
        self.core.fields().iter().filter(|f| f.is_diagnostic())
    }
}

impl TryFrom<TableDefinition> for Link {
    type Error = MetadataError;

    fn try_from(def: TableDefinition) -> Result<Self, Self::Error> {
        let link = Link::new(def.schema, def.name, def.fields)?;
        Ok(match def.staging {
            Some(location) => link.with_staging(location),
            None => link,
        })
    }
}

impl From<Link> for TableDefinition {
    fn from(link: Link) -> Self {
        TableDefinition::from_core(&link.core)
    }
}
