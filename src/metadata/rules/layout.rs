//! Rules for the kind-specific column layout of hubs, links and satellites.

use crate::hashing::MAX_DIGEST_WIDTH;
use crate::metadata::error::MetadataError;
use crate::metadata::field::Field;
use crate::metadata::HASHKEY_SUFFIX;

/// The field at position 1 must be a mandatory, fixed-width hash key.
///
/// When `expected` is given the key must carry exactly that name (hubs and
/// links name their own key `<table>_hashkey`); otherwise any hash-key name is
/// accepted (satellites store their parent's key).
pub(crate) fn check_key_field<'f>(
    table: &str,
    fields: &'f [Field],
    expected: Option<&str>,
) -> Result<&'f Field, MetadataError> {
    let key = &fields[0];
    let name_ok = match expected {
        Some(name) => key.name == name,
        None => key.is_hashkey(),
    };
    if !name_ok {
        return Err(MetadataError::UnexpectedField {
            table: table.to_string(),
            position: 1,
            expected: expected.map_or_else(|| format!("*{}", HASHKEY_SUFFIX), str::to_string),
            found: key.name.clone(),
        });
    }
    check_digest_field(table, key)?;
    Ok(key)
}

/// Digest columns (hash keys, hashdiffs) must be mandatory and sized.
pub(crate) fn check_digest_field(table: &str, field: &Field) -> Result<(), MetadataError> {
    if !field.is_mandatory {
        return Err(MetadataError::OptionalKeyField {
            table: table.to_string(),
            field: field.name.clone(),
        });
    }
    match field.length {
        None => Err(MetadataError::MissingDigestLength {
            table: table.to_string(),
            field: field.name.clone(),
        }),
        Some(length) if length == 0 || length as usize > MAX_DIGEST_WIDTH => {
            Err(MetadataError::InvalidDigestLength {
                table: table.to_string(),
                field: field.name.clone(),
                length,
            })
        }
        Some(_) => Ok(()),
    }
}

/// Requires `name` to be present anywhere in the table.
pub(crate) fn require<'f>(table: &str, fields: &'f [Field], name: &str) -> Result<&'f Field, MetadataError> {
    fields.iter().find(|f| f.name == name).ok_or_else(|| MetadataError::MissingField {
        table: table.to_string(),
        field: name.to_string(),
    })
}

/// Requires `name` to sit at exactly `position`.
pub(crate) fn require_at<'f>(
    table: &str,
    fields: &'f [Field],
    position: u32,
    name: &str,
) -> Result<&'f Field, MetadataError> {
    match fields.get(position as usize - 1) {
        Some(f) if f.name == name => Ok(f),
        Some(f) => Err(MetadataError::UnexpectedField {
            table: table.to_string(),
            position,
            expected: name.to_string(),
            found: f.name.clone(),
        }),
        None => Err(MetadataError::MissingField {
            table: table.to_string(),
            field: name.to_string(),
        }),
    }
}
