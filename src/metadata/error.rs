//! Defines the error type raised while building table metadata.
use thiserror::Error;

/// A malformed table, field or driving-key definition.
///
/// Raised at construction or registration time, before any batch runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("table '{table}' declares no fields")]
    NoFields { table: String },
    #[error("field '{field}' declares parent table '{declared}' but was given to table '{table}'")]
    ForeignField { table: String, field: String, declared: String },
    #[error("table '{table}' declares field '{field}' more than once")]
    DuplicateFieldName { table: String, field: String },
    #[error("table '{table}' declares position {position} more than once")]
    DuplicatePosition { table: String, position: u32 },
    #[error("field positions of table '{table}' are not contiguous: expected {expected}, found {found} on '{field}'")]
    PositionGap { table: String, field: String, expected: u32, found: u32 },
    #[error("key field '{field}' of table '{table}' is declared optional")]
    OptionalKeyField { table: String, field: String },
    #[error("key field '{field}' of table '{table}' declares no digest length")]
    MissingDigestLength { table: String, field: String },
    #[error("key field '{field}' of table '{table}' declares digest length {length}; expected 1 to 64")]
    InvalidDigestLength { table: String, field: String, length: u32 },
    #[error("table '{table}' expects '{expected}' at position {position}, found '{found}'")]
    UnexpectedField { table: String, position: u32, expected: String, found: String },
    #[error("table '{table}' is missing required field '{field}'")]
    MissingField { table: String, field: String },
    #[error("number field '{field}' of table '{table}' has invalid precision/scale")]
    InvalidNumeric { table: String, field: String },
    #[error("hub '{table}' declares no business key")]
    NoBusinessKey { table: String },
    #[error("link '{table}' references {found} hub(s); at least two are required")]
    TooFewHubs { table: String, found: usize },
    #[error("effectivity satellite '{table}' declares no driving key")]
    NoDrivingKey { table: String },
    #[error("driving key '{field}' of '{satellite}' is invalid: {reason}")]
    InvalidDrivingKey { satellite: String, field: String, reason: String },
    #[error("driving key '{field}' of '{satellite}' does not exist on parent table '{parent}'")]
    UnknownDrivingKey { satellite: String, parent: String, field: String },
    #[error("role-playing table '{table}' declares no parent table")]
    MissingParent { table: String },
    #[error("role-playing table '{table}' names parent '{parent}' of kind {found}; expected {expected}")]
    RolePlayingKind { table: String, parent: String, found: String, expected: String },
    #[error("table '{table}' is registered more than once")]
    DuplicateTable { table: String },
}
