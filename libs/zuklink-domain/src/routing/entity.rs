//! Routing tables
//!
//! A routing table says, for one query, which instance answers for which
//! segments. Tables are value objects: built once, never mutated after they
//! are handed out, and safe to share across query threads.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::cluster::InstanceId;

/// Mapping from serving instance to the segments it answers for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable {
    assignments: BTreeMap<InstanceId, BTreeSet<String>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a segment to an instance
    pub(crate) fn assign(&mut self, instance: InstanceId, segment: String) {
        self.assignments.entry(instance).or_default().insert(segment);
    }

    /// Segments served by `instance`, if it serves any
    pub fn segments_for(&self, instance: &InstanceId) -> Option<&BTreeSet<String>> {
        self.assignments.get(instance)
    }

    /// Instance serving `segment` in this table
    pub fn instance_for(&self, segment: &str) -> Option<&InstanceId> {
        self.assignments
            .iter()
            .find(|(_, segments)| segments.contains(segment))
            .map(|(instance, _)| instance)
    }

    /// Instances with at least one assigned segment
    pub fn instances(&self) -> impl Iterator<Item = &InstanceId> {
        self.assignments.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &BTreeSet<String>)> {
        self.assignments.iter()
    }

    /// Number of segments assigned to each instance
    pub fn segment_counts(&self) -> BTreeMap<&InstanceId, usize> {
        self.assignments
            .iter()
            .map(|(instance, segments)| (instance, segments.len()))
            .collect()
    }

    /// Total number of assigned segments
    pub fn segment_count(&self) -> usize {
        self.assignments.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl FromIterator<(InstanceId, String)> for RoutingTable {
    fn from_iter<I: IntoIterator<Item = (InstanceId, String)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (instance, segment) in iter {
            table.assign(instance, segment);
        }
        table
    }
}

/// The alternative routing tables produced by one build
///
/// The query router picks one table per incoming query; the index carries no
/// meaning beyond being stable within this set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTableSet {
    table_name: String,
    tables: Vec<RoutingTable>,
    /// Segments with no eligible replica in this build; absent from every table
    unassignable_segments: Vec<String>,
}

impl RoutingTableSet {
    pub fn new(
        table_name: impl Into<String>,
        tables: Vec<RoutingTable>,
        unassignable_segments: Vec<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            tables,
            unassignable_segments,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn tables(&self) -> &[RoutingTable] {
        &self.tables
    }

    pub fn get(&self, index: usize) -> Option<&RoutingTable> {
        self.tables.get(index)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn unassignable_segments(&self) -> &[String] {
        &self.unassignable_segments
    }
}
