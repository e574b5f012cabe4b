//! Defines the `Field` type, describing a single column of a target table.

use serde::{Deserialize, Serialize};

/// Physical data type of a column in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Boolean,
    /// Fixed-point number; requires `precision` and `scale` on the field.
    Number,
    Float,
    Date,
    Time,
    /// Timestamp without time zone.
    TimestampNtz,
    /// Timestamp in the session's local time zone.
    TimestampLtz,
    TimestampTz,
    Variant,
}

impl FieldDataType {
    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            FieldDataType::TimestampNtz | FieldDataType::TimestampLtz | FieldDataType::TimestampTz
        )
    }
}

/// Describes one column of a hub, link or satellite.
///
/// A field knows which table it belongs to and where it sits in that table.
/// Positions are 1-based and must form a contiguous sequence per table; the
/// table constructors enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub parent_table_name: String,
    pub name: String,
    pub data_type: FieldDataType,
    pub position: u32,
    pub is_mandatory: bool,
    /// Fixed width of digest fields (hash keys, hashdiffs), in hex characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

impl Field {
    pub fn new(
        parent_table_name: impl Into<String>,
        name: impl Into<String>,
        data_type: FieldDataType,
        position: u32,
        is_mandatory: bool,
    ) -> Self {
        Self {
            parent_table_name: parent_table_name.into(),
            name: name.into(),
            data_type,
            position,
            is_mandatory,
            length: None,
            precision: None,
            scale: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_numeric(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Digest width in hex characters, falling back to the crate default.
    pub fn digest_width(&self) -> usize {
        self.length
            .map(|l| l as usize)
            .unwrap_or(crate::hashing::DEFAULT_DIGEST_WIDTH)
    }

    pub fn is_hashkey(&self) -> bool {
        self.name.ends_with(super::HASHKEY_SUFFIX)
    }

    /// Name of the table whose hash key this field stores, if it is a hash key.
    pub fn referenced_table(&self) -> Option<&str> {
        self.name.strip_suffix(super::HASHKEY_SUFFIX)
    }

    pub fn is_child_key(&self) -> bool {
        self.name.starts_with(super::CHILD_KEY_PREFIX)
    }

    pub fn is_diagnostic(&self) -> bool {
        self.name.starts_with(super::DIAGNOSTIC_PREFIX)
    }

    /// True for the load metadata columns every table carries.
    pub fn is_record_metadata(&self) -> bool {
        matches!(
            self.name.as_str(),
            super::RECORD_START_TIMESTAMP | super::RECORD_END_TIMESTAMP | super::RECORD_SOURCE
        ) || self.name == super::HASHDIFF
    }
}
