//! The metadata model: fields, table kinds, driving keys and the registry.
//!
//! Every type here validates on construction and is immutable afterwards. A
//! definition that fails a rule is rejected with a `MetadataError` before any
//! batch is planned.

pub use self::error::MetadataError;
pub use self::field::{Field, FieldDataType};
pub use self::hub::Hub;
pub use self::link::Link;
pub use self::registry::TableRegistry;
pub use self::role_playing::{RolePlayingHub, RolePlayingLink};
pub use self::satellite::{DrivingKeyField, EffectivitySatellite, Satellite};
pub use self::table::{Table, TableCore, TableDefinition, TableKind};

// --- MODULE DECLARATIONS ---
mod error;
mod field;
mod hub;
mod link;
mod registry;
mod role_playing;
mod satellite;
mod table;
mod rules {
    pub mod layout;
    pub mod positions;
}

// --- NAMING CONVENTIONS ---
pub const HASHKEY_SUFFIX: &str = "_hashkey";
pub const HASHDIFF: &str = "s_hashdiff";
pub const RECORD_START_TIMESTAMP: &str = "r_timestamp";
pub const RECORD_END_TIMESTAMP: &str = "r_timestamp_end";
pub const RECORD_SOURCE: &str = "r_source";
pub const CHILD_KEY_PREFIX: &str = "ck_";
/// Carried into the target but excluded from hash keys and hashdiffs.
pub const DIAGNOSTIC_PREFIX: &str = "x_";
