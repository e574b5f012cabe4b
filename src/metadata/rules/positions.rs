//! Rule for structural consistency of a table's field list.

use crate::metadata::error::MetadataError;
use crate::metadata::field::{Field, FieldDataType};
use std::collections::HashSet;

/// Checks ownership, naming, numeric sizing and position contiguity, then
/// returns the fields sorted by position.
///
/// Positions must be exactly `1..=N`. Errors name the first offending field in
/// position order, so the same definition always reports the same problem.
pub(crate) fn validate_and_sort(table: &str, mut fields: Vec<Field>) -> Result<Vec<Field>, MetadataError> {
    if fields.is_empty() {
        return Err(MetadataError::NoFields { table: table.to_string() });
    }

    let mut names = HashSet::with_capacity(fields.len());
    for field in &fields {
        if field.parent_table_name != table {
            return Err(MetadataError::ForeignField {
                table: table.to_string(),
                field: field.name.clone(),
                declared: field.parent_table_name.clone(),
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(MetadataError::DuplicateFieldName {
                table: table.to_string(),
                field: field.name.clone(),
            });
        }
        if field.data_type == FieldDataType::Number {
            let valid = matches!(
                (field.precision, field.scale),
                (Some(p), Some(s)) if (1..=38).contains(&p) && s <= p
            );
            if !valid {
                return Err(MetadataError::InvalidNumeric {
                    table: table.to_string(),
                    field: field.name.clone(),
                });
            }
        }
    }

    fields.sort_by_key(|f| f.position);

    let mut expected = 1;
    for field in &fields {
        if (1..expected).contains(&field.position) {
            return Err(MetadataError::DuplicatePosition {
                table: table.to_string(),
                position: field.position,
            });
        }
        if field.position != expected {
            return Err(MetadataError::PositionGap {
                table: table.to_string(),
                field: field.name.clone(),
                expected,
                found: field.position,
            });
        }
        expected += 1;
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str, position: u32) -> Field {
        Field::new("t", name, FieldDataType::Text, position, true)
    }

    #[test]
    fn test_sorts_by_position() {
        let fields = vec![text("b", 2), text("c", 3), text("a", 1)];
        let sorted = validate_and_sort("t", fields).unwrap();
        let names: Vec<_> = sorted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_gap_is_rejected() {
        let err = validate_and_sort("t", vec![text("a", 1), text("c", 3)]).unwrap_err();
        assert_eq!(
            err,
            MetadataError::PositionGap { table: "t".into(), field: "c".into(), expected: 2, found: 3 }
        );
    }

    #[test]
    fn test_duplicate_position_is_rejected() {
        let err = validate_and_sort("t", vec![text("a", 1), text("b", 1)]).unwrap_err();
        assert_eq!(err, MetadataError::DuplicatePosition { table: "t".into(), position: 1 });
    }

    #[test]
    fn test_position_zero_is_a_gap() {
        let err = validate_and_sort("t", vec![text("a", 0), text("b", 1)]).unwrap_err();
        assert_eq!(
            err,
            MetadataError::PositionGap { table: "t".into(), field: "a".into(), expected: 1, found: 0 }
        );
    }

    #[test]
    fn test_largest_position_does_not_overflow() {
        let err = validate_and_sort("t", vec![text("a", 1), text("b", u32::MAX)]).unwrap_err();
        assert!(matches!(err, MetadataError::PositionGap { expected: 2, found: u32::MAX, .. }));
    }

    #[test]
    fn test_sequence_must_start_at_one() {
        let err = validate_and_sort("t", vec![text("a", 2)]).unwrap_err();
        assert!(matches!(err, MetadataError::PositionGap { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_number_requires_precision() {
        let field = Field::new("t", "n", FieldDataType::Number, 1, false);
        let err = validate_and_sort("t", vec![field.clone()]).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidNumeric { .. }));
        assert!(validate_and_sort("t", vec![field.with_numeric(18, 8)]).is_ok());
    }

    #[test]
    fn test_field_of_other_table_is_rejected() {
        let stray = Field::new("other", "a", FieldDataType::Text, 1, true);
        let err = validate_and_sort("t", vec![stray]).unwrap_err();
        assert!(matches!(err, MetadataError::ForeignField { .. }));
    }
}
