//! Hub metadata: one row per unique business key.

use super::error::MetadataError;
use super::field::Field;
use super::rules::layout;
use super::table::{TableCore, TableDefinition};
use super::{HASHKEY_SUFFIX, RECORD_SOURCE, RECORD_START_TIMESTAMP};
use crate::staging::StagingLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableDefinition", into = "TableDefinition")]
pub struct Hub {
    core: TableCore,
}

impl Hub {
    /// Builds a hub, validating its layout.
    ///
    /// The key must be `<name>_hashkey` at position 1; `r_timestamp` and
    /// `r_source` must be present; every other non-diagnostic field is part of
    /// the business key, and there must be at least one.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Result<Self, MetadataError> {
        let name = name.into();
        let core = TableCore::new(schema.into(), name.clone(), fields)?;
        let expected_key = format!("{}{}", name, HASHKEY_SUFFIX);
        layout::check_key_field(&name, core.fields(), Some(&expected_key))?;
        layout::require(&name, core.fields(), RECORD_START_TIMESTAMP)?;
        layout::require(&name, core.fields(), RECORD_SOURCE)?;

        let hub = Self { core };
        if hub.business_key().next().is_none() {
            return Err(MetadataError::NoBusinessKey { table: name });
        }
        Ok(hub)
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

    pub fn business_key(&self) -> impl Iterator<Item = &Field> {
        self.core.fields()[1..]
            .iter()
            .filter(|f| !f.is_record_metadata() && !f.is_diagnostic())
    }
}

impl TryFrom<TableDefinition> for Hub {
    type Error = MetadataError;

    fn try_from(def: TableDefinition) -> Result<Self, Self::Error> {
        let hub = Hub::new(def.schema, def.name, def.fields)?;
        Ok(match def.staging {
            Some(location) => hub.with_staging(location),
            None => hub,
        })
    }
}

impl From<Hub> for TableDefinition {
    fn from(hub: Hub) -> Self {
        TableDefinition::from_core(&hub.core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::metadata::FieldDataType;
    use rstest::rstest;

    #[rstest]
    fn test_business_key_excludes_metadata(h_customer: Hub) {
        let keys: Vec<_> = h_customer.business_key().map(|f| f.name.as_str()).collect();
        assert_eq!(keys, ["customer_id"]);
        assert_eq!(h_customer.hashkey_field().name, "h_customer_hashkey");
    }

    #[test]
    fn test_optional_key_field_is_rejected() {
        let mut fields = hub_fields("h_customer", "customer_id");
        fields[0].is_mandatory = false;
        let err = Hub::new("dv", "h_customer", fields).unwrap_err();
        assert_eq!(
            err,
            MetadataError::OptionalKeyField { table: "h_customer".into(), field: "h_customer_hashkey".into() }
        );
    }

    #[rstest]
    #[case(0)]
    #[case(128)]
    fn test_unusable_key_width_is_rejected(#[case] length: u32) {
        let mut fields = hub_fields("h_customer", "customer_id");
        fields[0].length = Some(length);
        let err = Hub::new("dv", "h_customer", fields).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidDigestLength { length: l, .. } if l == length));
    }

    #[test]
    fn test_position_at_integer_limit_is_rejected() {
        let mut fields = hub_fields("h_customer", "customer_id");
        fields[3].position = u32::MAX;
        let err = Hub::new("dv", "h_customer", fields).unwrap_err();
        assert!(matches!(err, MetadataError::PositionGap { expected: 4, found: u32::MAX, .. }));
    }

    #[test]
    fn test_key_must_be_named_after_hub() {
        let fields = hub_fields("h_customer", "customer_id")
            .into_iter()
            .map(|mut f| {
                f.parent_table_name = "h_client".into();
                f
            })
            .collect();
        let err = Hub::new("dv", "h_client", fields).unwrap_err();
        assert!(matches!(err, MetadataError::UnexpectedField { position: 1, .. }));
    }

    #[test]
    fn test_hub_without_business_key_is_rejected() {
        let fields = vec![
            Field::new("h_x", "h_x_hashkey", FieldDataType::Text, 1, true).with_length(32),
            Field::new("h_x", "r_timestamp", FieldDataType::TimestampNtz, 2, true),
            Field::new("h_x", "r_source", FieldDataType::Text, 3, true),
        ];
        let err = Hub::new("dv", "h_x", fields).unwrap_err();
        assert_eq!(err, MetadataError::NoBusinessKey { table: "h_x".into() });
    }

    #[test]
    fn test_missing_record_source_is_rejected() {
        let mut fields = hub_fields("h_customer", "customer_id");
        fields.retain(|f| f.name != "r_source");
        fields[2].position = 3;
        let err = Hub::new("dv", "h_customer", fields).unwrap_err();
        assert!(matches!(err, MetadataError::MissingField { ref field, .. } if field == "r_source"));
    }

    #[rstest]
    fn test_definition_round_trip_revalidates(h_customer: Hub) {
        let json = serde_json::to_string(&h_customer).unwrap();
        let back: Hub = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h_customer);

        let broken = json.replace("\"position\":4", "\"position\":5");
        assert!(serde_json::from_str::<Hub>(&broken).is_err());
    }
}
