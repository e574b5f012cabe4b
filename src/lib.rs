// Crate root: the load-planning core of a Data Vault warehouse.
// Table metadata and one staged batch go in; a dependency-ordered
// plan of per-table load operations comes out.

// --- Module Declarations ---
pub mod config;
pub mod display;
pub mod error;
pub mod execution;
pub mod generate;
pub mod hashing;
pub mod metadata;
pub mod orchestrator;
pub mod plan;
pub mod staging;

#[cfg(test)]
mod fixtures;

// --- Public Surface ---
pub use config::LoadConfig;
pub use error::{LoadError, Result};
pub use execution::{ExecutionError, ExecutionReport, MemoryTarget, PlanExecutor};
pub use metadata::{
    DrivingKeyField, EffectivitySatellite, Field, FieldDataType, Hub, Link, MetadataError, RolePlayingHub,
    RolePlayingLink, Satellite, Table, TableKind, TableRegistry,
};
pub use orchestrator::DataVaultLoad;
pub use plan::{LoadOperation, LoadPlan, OperationKind};
pub use staging::{MemoryStaging, StagedRow, StagingLocation, StagingProvider, Value};
