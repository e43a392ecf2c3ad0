//! Routing service - Keeps the current routing table set of every table
//!
//! The service is driven by external view change events. Each event rebuilds
//! the routing tables of one table: eligibility is computed once, then every
//! table is generated on tokio's blocking pool in parallel. The finished set
//! replaces the previous one unless a newer event, or a later drop of the
//! table, has already been recorded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};
use zuklink_domain::cluster::{ExternalView, InstanceConfig};
use zuklink_domain::routing::{RoutingError, RoutingTable, RoutingTableBuilder, RoutingTableSet};

use crate::error::{BrokerError, Result};

/// Routing state of one table, tagged with the event that produced it
struct InstalledTables {
    generation: u64,
    /// `None` once the table was dropped
    tables: Option<Arc<RoutingTableSet>>,
}

/// Service holding the latest routing table set per table
///
/// Generic over the `RoutingTableBuilder` port so tests can drive it with a mock.
pub struct RoutingService<B> {
    builder: Arc<B>,
    installed: RwLock<HashMap<String, InstalledTables>>,
    generation: AtomicU64,
}

impl<B> RoutingService<B>
where
    B: RoutingTableBuilder + 'static,
{
    /// Create a new RoutingService around an initialized builder
    pub fn new(builder: B) -> Self {
        Self {
            builder: Arc::new(builder),
            installed: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Rebuild the routing tables of `table_name` from a new external view
    ///
    /// # Errors
    ///
    /// - `RoutingError::TableMismatch` if the view belongs to another table
    /// - `RoutingError::BuildFailed` if a table generation worker did not finish
    /// - any error the builder reports while computing eligibility
    #[instrument(skip(self, external_view, instance_configs), fields(segments = external_view.segment_count()))]
    pub async fn on_external_view_change(
        &self,
        table_name: &str,
        external_view: ExternalView,
        instance_configs: Vec<InstanceConfig>,
    ) -> Result<Arc<RoutingTableSet>> {
        if external_view.table_name() != table_name {
            return Err(
                RoutingError::table_mismatch(table_name, external_view.table_name()).into(),
            );
        }

        let generation = self.next_generation();
        let snapshot = Arc::new(
            self.builder
                .compute_eligibility(&external_view, &instance_configs)?,
        );
        let table_count = self.builder.table_count();

        let mut workers = JoinSet::new();
        for index in 0..table_count {
            let builder = Arc::clone(&self.builder);
            let snapshot = Arc::clone(&snapshot);
            workers.spawn_blocking(move || (index, builder.build_table(&snapshot, index)));
        }

        let mut slots: Vec<Option<RoutingTable>> = vec![None; table_count];
        while let Some(joined) = workers.join_next().await {
            let (index, table) = joined.map_err(|e| RoutingError::build_failed(e.to_string()))?;
            slots[index] = Some(table);
        }
        let tables = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| RoutingError::build_failed("a routing table was not generated"))?;

        let tables = Arc::new(RoutingTableSet::new(
            table_name,
            tables,
            snapshot.unassignable_segments(),
        ));
        self.install(table_name, generation, Arc::clone(&tables)).await;

        info!(
            table = table_name,
            generation,
            table_count = tables.len(),
            routed_segments = snapshot.segment_count() - tables.unassignable_segments().len(),
            unassignable = tables.unassignable_segments().len(),
            "Rebuilt routing tables"
        );

        Ok(tables)
    }

    /// Install a routing table set unless a newer set or drop is already recorded
    async fn install(&self, table_name: &str, generation: u64, tables: Arc<RoutingTableSet>) {
        let mut installed = self.installed.write().await;

        let current = installed.get(table_name).map(|entry| entry.generation);

        if let Some(current) = current.filter(|&current| current > generation) {
            debug!(
                table = table_name,
                generation, current, "Discarded superseded routing tables"
            );
            return;
        }

        installed.insert(
            table_name.to_string(),
            InstalledTables {
                generation,
                tables: Some(tables),
            },
        );
    }

    /// Current routing table set of a table
    ///
    /// # Errors
    ///
    /// Returns `BrokerError::UnknownTable` if no set was built for the table
    /// or the table was dropped since
    pub async fn routing_tables(&self, table_name: &str) -> Result<Arc<RoutingTableSet>> {
        self.installed
            .read()
            .await
            .get(table_name)
            .and_then(|installed| installed.tables.clone())
            .ok_or_else(|| BrokerError::UnknownTable(table_name.to_string()))
    }

    /// Forget the routing state of a table; returns whether it had routing tables
    ///
    /// Rebuilds that started before the drop are discarded when they finish.
    pub async fn drop_table(&self, table_name: &str) -> bool {
        let mut installed = self.installed.write().await;

        let Some(entry) = installed.get_mut(table_name) else {
            return false;
        };
        if entry.tables.is_none() {
            return false;
        }

        *entry = InstalledTables {
            generation: self.next_generation(),
            tables: None,
        };
        info!(
            table = table_name,
            generation = entry.generation,
            "Dropped routing tables"
        );
        true
    }

    /// Names of all tables with installed routing tables, sorted
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .installed
            .read()
            .await
            .iter()
            .filter(|(_, installed)| installed.tables.is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
