//! Satellite metadata: descriptive, time-versioned history of a hub or link.

use super::error::MetadataError;
use super::field::Field;
use super::rules::layout;
use super::table::{TableCore, TableDefinition};
use super::{HASHDIFF, RECORD_END_TIMESTAMP, RECORD_SOURCE, RECORD_START_TIMESTAMP};
use crate::staging::StagingLocation;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Position of the first descriptive field; 1..=5 are fixed by the layout.
const FIRST_DESCRIPTIVE_POSITION: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct Satellite {
    core: TableCore,
}

impl Satellite {
    /// Builds a satellite, validating its layout.
    ///
    /// Positions 1 through 5 are fixed: the parent's hash key, `s_hashdiff`,
    /// `r_timestamp`, `r_timestamp_end` and `r_source`. Everything after is
    /// descriptive payload.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Result<Self, MetadataError> {
        let name = name.into();
        let core = TableCore::new(schema.into(), name.clone(), fields)?;
        let fields = core.fields();
        layout::check_key_field(&name, fields, None)?;
        let hashdiff = layout::require_at(&name, fields, 2, HASHDIFF)?;
        layout::check_digest_field(&name, hashdiff)?;
        layout::require_at(&name, fields, 3, RECORD_START_TIMESTAMP)?;
        layout::require_at(&name, fields, 4, RECORD_END_TIMESTAMP)?;
        layout::require_at(&name, fields, 5, RECORD_SOURCE)?;
        Ok(Self { core })
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

    /// The hub or link this satellite describes, derived from its key field.
    pub fn parent_table_name(&self) -> &str {
        // Layout validation guarantees the `_hashkey` suffix.
        self.core.key_field().referenced_table().unwrap_or_default()
    }

    pub fn hashdiff_field(&self) -> &Field {
        &self.core.fields()[1]
    }

    pub fn descriptive_fields(&self) -> &[Field] {
        self.core
            .fields()
            .get(FIRST_DESCRIPTIVE_POSITION - 1..)
            .unwrap_or_default()
    }

    /// Descriptive fields that contribute to the hashdiff.
    pub fn hashdiff_fields(&self) -> impl Iterator<Item = &Field> {
        self.descriptive_fields().iter().filter(|f| !f.is_diagnostic())
    }
}

impl TryFrom<TableDefinition> for Satellite {
    type Error = MetadataError;

    fn try_from(def: TableDefinition) -> Result<Self, Self::Error> {
        let sat = Satellite::new(def.schema, def.name, def.fields)?;
        Ok(match def.staging {
            Some(location) => sat.with_staging(location),
            None => sat,
        })
    }
}

impl From<Satellite> for TableDefinition {
    fn from(sat: Satellite) -> Self {
        TableDefinition::from_core(&sat.core)
    }
}

/// Names the link column whose value identifies "the same relationship" for
/// an effectivity satellite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrivingKeyField {
    pub name: String,
    pub parent_table_name: String,
    pub satellite_name: String,
}

impl DrivingKeyField {
    pub fn new(
        name: impl Into<String>,
        parent_table_name: impl Into<String>,
        satellite_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent_table_name: parent_table_name.into(),
            satellite_name: satellite_name.into(),
        }
    }
}

/// A satellite on a link whose history is grouped by driving key rather than
/// by the link's hash key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct EffectivitySatellite {
    satellite: Satellite,
    driving_keys: Vec<DrivingKeyField>,
}

impl EffectivitySatellite {
    /// Builds an effectivity satellite.
    ///
    /// Every driving key must name this satellite and its parent link. Whether
    /// the named field exists on the link is checked once the link is known,
    /// at registration.
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<Field>,
        driving_keys: Vec<DrivingKeyField>,
    ) -> Result<Self, MetadataError> {
        let satellite = Satellite::new(schema, name, fields)?;
        let name = satellite.name();
        if driving_keys.is_empty() {
            return Err(MetadataError::NoDrivingKey { table: name.to_string() });
        }

        let invalid = |key: &DrivingKeyField, reason: String| MetadataError::InvalidDrivingKey {
            satellite: name.to_string(),
            field: key.name.clone(),
            reason,
        };
        let mut seen = HashSet::new();
        for key in &driving_keys {
            if key.satellite_name != name {
                return Err(invalid(key, format!("declared for satellite '{}'", key.satellite_name)));
            }
            if key.parent_table_name != satellite.parent_table_name() {
                return Err(invalid(
                    key,
                    format!(
                        "parent '{}' is not the satellite's link '{}'",
                        key.parent_table_name,
                        satellite.parent_table_name()
                    ),
                ));
            }
            if !seen.insert(key.name.as_str()) {
                return Err(invalid(key, "declared more than once".to_string()));
            }
        }

        Ok(Self { satellite, driving_keys })
    }

    pub fn with_staging(mut self, location: StagingLocation) -> Self {
        self.satellite = self.satellite.with_staging(location);
        self
    }

    pub fn satellite(&self) -> &Satellite {
        &self.satellite
    }

    pub fn name(&self) -> &str {
        self.satellite.name()
    }

    pub fn driving_keys(&self) -> &[DrivingKeyField] {
        &self.driving_keys
    }
}

impl TryFrom<TableDefinition> for EffectivitySatellite {
    type Error = MetadataError;

    fn try_from(def: TableDefinition) -> Result<Self, Self::Error> {
        let eff = EffectivitySatellite::new(def.schema, def.name, def.fields, def.driving_keys)?;
        Ok(match def.staging {
            Some(location) => eff.with_staging(location),
            None => eff,
        })
    }
}

impl From<EffectivitySatellite> for TableDefinition {
    fn from(eff: EffectivitySatellite) -> Self {
        let mut def = TableDefinition::from_core(eff.satellite.core());
        def.driving_keys = eff.driving_keys;
        def
    }
}
