//! One extraction batch: target tables in, ordered load plan out.

use crate::config::LoadConfig;
use crate::error::Result;
use crate::execution::{ExecutionReport, PlanExecutor};
use crate::generate::{generate_operation, BatchContext};
use crate::metadata::{Table, TableRegistry};
use crate::plan::{topology, LoadOperation, LoadPlan, OrderingError};
use crate::staging::{StagingLocation, StagingProvider};
use rayon::prelude::*;

/// Plans the load of one staged batch into a set of target tables.
///
/// An instance belongs to exactly one batch: every target table reads from
/// the batch staging location `<staging_table>_<YYYYMMDD_HHMMSS>`. Tables the
/// targets refer to without being loaded themselves (for example the parent
/// of a role-playing hub) are looked up in the registry.
#[derive(Debug, Clone)]
pub struct DataVaultLoad {
    config: LoadConfig,
    target_tables: Vec<Table>,
    registry: TableRegistry,
}

impl DataVaultLoad {
    pub fn new(config: LoadConfig, target_tables: Vec<Table>, registry: &TableRegistry) -> Result<Self> {
        let location = config.staging_location();
        let target_tables: Vec<Table> = target_tables
            .into_iter()
            .map(|t| t.with_staging(location.clone()))
            .collect();

        let mut registry = registry.clone();
        for table in &target_tables {
            registry.register_or_confirm(table)?;
        }

        Ok(Self { config, target_tables, registry })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    pub fn target_tables(&self) -> &[Table] {
        &self.target_tables
    }

    pub fn staging_location(&self) -> StagingLocation {
        self.config.staging_location()
    }

    /// Target tables in the order their operations are emitted.
    pub fn loading_order(&self) -> std::result::Result<Vec<&Table>, OrderingError> {
        topology::load_order(&self.target_tables)
    }

    /// Builds the load plan of this batch. Nothing is executed.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(source = %self.config.source, staging = %self.staging_location())
    )]
    pub fn plan(&self, staging: &dyn StagingProvider) -> Result<LoadPlan> {
        let order = self.loading_order()?;
        let ctx = BatchContext { config: &self.config, registry: &self.registry, staging };

        let operations: Vec<LoadOperation> = if self.config.parallel {
            order.par_iter().map(|table| generate_operation(table, &ctx)).collect::<Result<_>>()?
        } else {
            order.iter().map(|table| generate_operation(table, &ctx)).collect::<Result<_>>()?
        };

        for op in &operations {
            tracing::debug!(table = %op.target, kind = %op.kind, rows = op.rows.len(), "generated operation");
        }

        let plan = LoadPlan {
            source: self.config.source.clone(),
            extract_start_timestamp: self.config.record_timestamp(),
            open_end_timestamp: self.config.open_end_timestamp,
            staging: self.staging_location(),
            extract: self.config.extract_location(),
            operations,
        };
        tracing::info!(operations = plan.operations.len(), rows = plan.row_count(), "built load plan");
        Ok(plan)
    }

    /// Builds the plan and hands it to `executor`.
    pub fn execute<E: PlanExecutor + ?Sized>(
        &self,
        staging: &dyn StagingProvider,
        executor: &mut E,
    ) -> Result<ExecutionReport> {
        let plan = self.plan(staging)?;
        Ok(executor.apply(&plan)?)
    }
}
