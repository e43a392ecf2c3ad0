//! Port trait for routing table builders
//!
//! The broker depends on this trait rather than on a concrete builder, so
//! that different table types (streaming, batch) can plug in their own
//! routing strategy and tests can substitute mocks.
//!
//! Building is split in two phases. Eligibility is computed once per external
//! view change; tables are then generated independently from the shared,
//! read-only snapshot, which lets callers build them on parallel workers.

use super::{
    BuilderConfig, EligibilitySnapshot, Result, RoutingTable, RoutingTableSet,
};
use crate::cluster::{ExternalView, InstanceConfig};

/// Port for routing table construction
pub trait RoutingTableBuilder: Send + Sync {
    /// Apply builder configuration
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::InvalidConfig` if a recognized key has an unusable value
    fn init(&mut self, config: &BuilderConfig) -> Result<()>;

    /// Number of routing tables produced per build
    fn table_count(&self) -> usize;

    /// Compute the eligible replicas of every routable segment
    ///
    /// # Arguments
    ///
    /// * `external_view` - Current replica states of the table
    /// * `instance_configs` - Instances currently in the serving cluster
    fn compute_eligibility(
        &self,
        external_view: &ExternalView,
        instance_configs: &[InstanceConfig],
    ) -> Result<EligibilitySnapshot>;

    /// Generate the routing table at `index` from an eligibility snapshot
    ///
    /// Calls for different indexes are independent and may run concurrently.
    fn build_table(&self, snapshot: &EligibilitySnapshot, index: usize) -> RoutingTable;

    /// Compute the full routing table set for an external view
    fn compute_routing_tables(
        &self,
        external_view: &ExternalView,
        instance_configs: &[InstanceConfig],
    ) -> Result<RoutingTableSet> {
        let snapshot = self.compute_eligibility(external_view, instance_configs)?;
        let tables = (0..self.table_count())
            .map(|index| self.build_table(&snapshot, index))
            .collect();

        Ok(RoutingTableSet::new(
            snapshot.table_name(),
            tables,
            snapshot.unassignable_segments(),
        ))
    }
}
