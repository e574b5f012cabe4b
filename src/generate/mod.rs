//! Turns target tables plus staged rows into load operations.
//!
//! Each table kind has its own generator; `generate_operation` picks one by
//! matching on the `Table` variant. Generators are pure: they read the
//! registry and the staged batch and return an operation, nothing else.
pub(crate) mod effectivity;
pub(crate) mod hub_link;
pub mod keys;
pub(crate) mod mapping;
pub(crate) mod satellite;

pub use keys::{KeyResolver, KeyRule};

use crate::config::LoadConfig;
use crate::error::Result;
use crate::metadata::{Table, TableRegistry};
use crate::plan::LoadOperation;
use crate::staging::StagingProvider;
use mapping::TablePlan;

/// Read-only inputs shared by every generator of one batch.
#[derive(Clone, Copy)]
pub struct BatchContext<'a> {
    pub config: &'a LoadConfig,
    pub registry: &'a TableRegistry,
    pub staging: &'a dyn StagingProvider,
}

/// Builds the operation that loads `table` from the current batch.
///
/// A table without its own staging location reads the batch location of the
/// configuration.
pub fn generate_operation(table: &Table, ctx: &BatchContext<'_>) -> Result<LoadOperation> {
    let location = table.staging().cloned().unwrap_or_else(|| ctx.config.staging_location());
    let resolver = KeyResolver::new(ctx.registry);
    let plan = TablePlan::build(table, location, &resolver)?;

    let staged = ctx.staging.staged_rows(&plan.staging)?;
    let rows = plan.map_rows(staged, ctx.config)?;
    let open_end = ctx.config.open_end_timestamp;

    let operation = match table {
        Table::Hub(_) | Table::Link(_) | Table::RolePlayingHub(_) | Table::RolePlayingLink(_) => {
            hub_link::generate(plan, rows)
        }
        Table::Satellite(_) => satellite::generate(plan, rows, open_end)?,
        Table::EffectivitySatellite(_) => effectivity::generate(plan, rows, open_end)?,
    };
    Ok(operation)
}
