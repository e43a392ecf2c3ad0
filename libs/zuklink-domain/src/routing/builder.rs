//! Routing table builder for tables fed by per-partition stream consumers
//!
//! The builder has to uphold two guarantees for every table it produces:
//! a query sees each partition's data exactly once, even while a segment is
//! being flushed from CONSUMING to ONLINE, and read load is spread as evenly
//! as possible over the replicas.
//!
//! One build runs:
//! 1. group the streaming segments by partition, ordered by sequence number
//! 2. allow at most one segment per partition to be served from CONSUMING replicas
//! 3. compute each segment's eligible replicas
//! 4. generate N tables, each assigning segments smallest-eligible-set first
//!    with a weighted random replica pick
//!
//! Steps 1-3 run once per external view change, step 4 once per table.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::config::RoutingSettings;
use super::eligibility::{compute_eligible_replicas, EligibilitySnapshot};
use super::grouper::group_by_partition;
use super::ports::RoutingTableBuilder;
use super::resolver::resolve_consuming_segments;
use super::scheduler::assign_segments;
use super::{BuilderConfig, Result, RoutingTable};
use crate::cluster::{ExternalView, InstanceConfig, InstanceScope};

/// Routing table builder for streaming tables with low-level consumers
#[derive(Debug, Clone, Default)]
pub struct LowLevelConsumerRoutingTableBuilder {
    settings: RoutingSettings,
}

impl LowLevelConsumerRoutingTableBuilder {
    /// Create a builder with default settings (10 tables, entropy-seeded)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with explicit settings
    pub fn with_settings(settings: RoutingSettings) -> Self {
        Self { settings }
    }

    /// Create a builder from a key/value configuration
    pub fn from_config(config: &BuilderConfig) -> Result<Self> {
        Ok(Self::with_settings(RoutingSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    /// Random generator for the table at `index`
    ///
    /// Every table gets its own generator. With a configured seed, table `i`
    /// uses `seed + i`, so a build is reproducible table by table.
    fn table_rng(&self, index: usize) -> StdRng {
        match self.settings.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

impl RoutingTableBuilder for LowLevelConsumerRoutingTableBuilder {
    fn init(&mut self, config: &BuilderConfig) -> Result<()> {
        self.settings = RoutingSettings::from_config(config)?;
        debug!(
            table_count = self.settings.table_count,
            seeded = self.settings.random_seed.is_some(),
            "Initialized low-level consumer routing table builder"
        );
        Ok(())
    }

    fn table_count(&self) -> usize {
        self.settings.table_count
    }

    fn compute_eligibility(
        &self,
        external_view: &ExternalView,
        instance_configs: &[InstanceConfig],
    ) -> Result<EligibilitySnapshot> {
        let groups = group_by_partition(external_view);
        let decisions = resolve_consuming_segments(external_view, &groups);
        let scope = InstanceScope::from_configs(instance_configs);
        let snapshot = compute_eligible_replicas(external_view, &groups, &decisions, &scope);

        info!(
            table = external_view.table_name(),
            partitions = groups.len(),
            segments = snapshot.segment_count(),
            consuming_segments = decisions
                .values()
                .filter(|decision| decision.consuming_segment().is_some())
                .count(),
            unassignable = snapshot.unassignable_segments().len(),
            instances = scope.len(),
            "Computed replica eligibility"
        );

        Ok(snapshot)
    }

    fn build_table(&self, snapshot: &EligibilitySnapshot, index: usize) -> RoutingTable {
        let mut rng = self.table_rng(index);
        let table = assign_segments(snapshot, &mut rng);

        debug!(
            table = snapshot.table_name(),
            index,
            instances = table.instances().count(),
            segments = table.segment_count(),
            "Generated routing table"
        );

        table
    }
}
