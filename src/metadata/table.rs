//! The closed set of table kinds and the capabilities they share.

use super::error::MetadataError;
use super::field::Field;
use super::hub::Hub;
use super::link::Link;
use super::role_playing::{RolePlayingHub, RolePlayingLink};
use super::rules::positions;
use super::satellite::{DrivingKeyField, EffectivitySatellite, Satellite};
use crate::staging::StagingLocation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates the table variants without borrowing their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Hub,
    Link,
    Satellite,
    EffectivitySatellite,
    RolePlayingHub,
    RolePlayingLink,
}

impl TableKind {
    /// Load rank: every table of a lower rank is loaded before any table of a
    /// higher rank.
    pub fn rank(&self) -> u8 {
        match self {
            TableKind::Hub | TableKind::RolePlayingHub => 0,
            TableKind::Link | TableKind::RolePlayingLink => 1,
            TableKind::Satellite | TableKind::EffectivitySatellite => 2,
        }
    }

    pub fn is_hub_like(&self) -> bool {
        self.rank() == 0
    }

    pub fn is_link_like(&self) -> bool {
        self.rank() == 1
    }

    pub fn is_satellite_like(&self) -> bool {
        self.rank() == 2
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableKind::Hub => "hub",
            TableKind::Link => "link",
            TableKind::Satellite => "satellite",
            TableKind::EffectivitySatellite => "effectivity satellite",
            TableKind::RolePlayingHub => "role-playing hub",
            TableKind::RolePlayingLink => "role-playing link",
        };
        f.write_str(s)
    }
}

/// State shared by every table kind: identity, ordered fields, staging pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCore {
    schema: String,
    name: String,
    fields: Vec<Field>,
    staging: Option<StagingLocation>,
}

impl TableCore {
    pub(crate) fn new(schema: String, name: String, fields: Vec<Field>) -> Result<Self, MetadataError> {
        let fields = positions::validate_and_sort(&name, fields)?;
        Ok(Self { schema, name, fields, staging: None })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in position order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The hash-key field at position 1.
    pub fn key_field(&self) -> &Field {
        &self.fields[0]
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Explicit staging location; `None` means the batch default applies.
    pub fn staging(&self) -> Option<&StagingLocation> {
        self.staging.as_ref()
    }

    pub(crate) fn set_staging(&mut self, location: StagingLocation) {
        self.staging = Some(location);
    }
}

/// Serialized form of every table kind.
///
/// Deserializing a concrete kind goes through this type and then through the
/// kind's constructor, so a definition that loads is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<StagingLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub driving_keys: Vec<DrivingKeyField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_table_name: Option<String>,
}

impl TableDefinition {
    pub(crate) fn from_core(core: &TableCore) -> Self {
        Self {
            schema: core.schema.clone(),
            name: core.name.clone(),
            fields: core.fields.clone(),
            staging: core.staging.clone(),
            driving_keys: Vec::new(),
            parent_table_name: None,
        }
    }
}

/// A target table of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Table {
    Hub(Hub),
    Link(Link),
    Satellite(Satellite),
    EffectivitySatellite(EffectivitySatellite),
    RolePlayingHub(RolePlayingHub),
    RolePlayingLink(RolePlayingLink),
}

impl Table {
    pub fn core(&self) -> &TableCore {
        match self {
            Table::Hub(t) => t.core(),
            Table::Link(t) => t.core(),
            Table::Satellite(t) => t.core(),
            Table::EffectivitySatellite(t) => t.satellite().core(),
            Table::RolePlayingHub(t) => t.hub().core(),
            Table::RolePlayingLink(t) => t.link().core(),
        }
    }

    pub fn kind(&self) -> TableKind {
        match self {
            Table::Hub(_) => TableKind::Hub,
            Table::Link(_) => TableKind::Link,
            Table::Satellite(_) => TableKind::Satellite,
            Table::EffectivitySatellite(_) => TableKind::EffectivitySatellite,
            Table::RolePlayingHub(_) => TableKind::RolePlayingHub,
            Table::RolePlayingLink(_) => TableKind::RolePlayingLink,
        }
    }

    pub fn name(&self) -> &str {
        self.core().name()
    }

    pub fn schema(&self) -> &str {
        self.core().schema()
    }

    pub fn fields(&self) -> &[Field] {
        self.core().fields()
    }

    pub fn key_field(&self) -> &Field {
        self.core().key_field()
    }

    pub fn staging(&self) -> Option<&StagingLocation> {
        self.core().staging()
    }

    /// The same table, reading its staged rows from `location`.
    pub fn with_staging(self, location: StagingLocation) -> Self {
        match self {
            Table::Hub(t) => t.with_staging(location).into(),
            Table::Link(t) => t.with_staging(location).into(),
            Table::Satellite(t) => t.with_staging(location).into(),
            Table::EffectivitySatellite(t) => t.with_staging(location).into(),
            Table::RolePlayingHub(t) => t.with_staging(location).into(),
            Table::RolePlayingLink(t) => t.with_staging(location).into(),
        }
    }

    /// Equal apart from where the staged rows are read from.
    pub fn same_definition(&self, other: &Table) -> bool {
        let anywhere = StagingLocation::new("", "");
        self.clone().with_staging(anywhere.clone()) == other.clone().with_staging(anywhere)
    }

    /// Tables whose rows must exist before this table can be loaded.
    ///
    /// A role-playing parent is not a load dependency: only its key rule is
    /// borrowed, so it does not appear here.
    pub fn dependencies(&self) -> Vec<&str> {
        match self {
            Table::Hub(_) | Table::RolePlayingHub(_) => Vec::new(),
            Table::Link(link) => link.hub_names().collect(),
            Table::RolePlayingLink(rp) => rp.link().hub_names().collect(),
            Table::Satellite(sat) => vec![sat.parent_table_name()],
            Table::EffectivitySatellite(eff) => vec![eff.satellite().parent_table_name()],
        }
    }

    /// Name of the table whose key rule a role-playing table borrows.
    pub fn role_playing_parent(&self) -> Option<&str> {
        match self {
            Table::RolePlayingHub(rp) => Some(rp.parent_table_name()),
            Table::RolePlayingLink(rp) => Some(rp.parent_table_name()),
            _ => None,
        }
    }

    /// Fields whose values form this table's own business key, in position
    /// order. Empty for satellites, which borrow their parent's key.
    pub fn business_key(&self) -> Vec<&Field> {
        match self {
            Table::Hub(hub) => hub.business_key().collect(),
            Table::RolePlayingHub(rp) => rp.hub().business_key().collect(),
            Table::Link(link) => link.business_key().collect(),
            Table::RolePlayingLink(rp) => rp.link().business_key().collect(),
            Table::Satellite(_) | Table::EffectivitySatellite(_) => Vec::new(),
        }
    }
}

impl From<Hub> for Table {
    fn from(t: Hub) -> Self {
        Table::Hub(t)
    }
}

impl From<Link> for Table {
    fn from(t: Link) -> Self {
        Table::Link(t)
    }
}

impl From<Satellite> for Table {
    fn from(t: Satellite) -> Self {
        Table::Satellite(t)
    }
}

impl From<EffectivitySatellite> for Table {
    fn from(t: EffectivitySatellite) -> Self {
        Table::EffectivitySatellite(t)
    }
}

impl From<RolePlayingHub> for Table {
    fn from(t: RolePlayingHub) -> Self {
        Table::RolePlayingHub(t)
    }
}

impl From<RolePlayingLink> for Table {
    fn from(t: RolePlayingLink) -> Self {
        Table::RolePlayingLink(t)
    }
}
