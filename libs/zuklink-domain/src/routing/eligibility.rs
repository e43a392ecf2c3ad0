//! Eligible replica sets
//!
//! For each streaming segment, the instances that may answer queries for it
//! without the query seeing a partition's data twice.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::grouper::PartitionGroups;
use super::resolver::ConsumingDecision;
use crate::cluster::{ExternalView, InstanceId, InstanceScope, PartitionKey, ReplicaState};

/// A segment together with the instances allowed to serve it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReplicas {
    pub segment: String,
    pub eligible: BTreeSet<InstanceId>,
}

/// Read-only eligibility result of one build cycle
///
/// Computed once per external view change and shared by every routing table
/// generated from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilitySnapshot {
    table_name: String,
    entries: Vec<SegmentReplicas>,
}

impl EligibilitySnapshot {
    pub fn new(table_name: impl Into<String>, entries: Vec<SegmentReplicas>) -> Self {
        Self {
            table_name: table_name.into(),
            entries,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Entries in partition order, then sequence order
    pub fn entries(&self) -> &[SegmentReplicas] {
        &self.entries
    }

    /// Eligible replicas of a segment; `None` if the segment is not routed
    pub fn eligible_replicas(&self, segment: &str) -> Option<&BTreeSet<InstanceId>> {
        self.entries
            .iter()
            .find(|entry| entry.segment == segment)
            .map(|entry| &entry.eligible)
    }

    /// Segments no replica may currently serve
    pub fn unassignable_segments(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.eligible.is_empty())
            .map(|entry| entry.segment.clone())
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute the eligible replica set of every grouped segment
///
/// An instance is eligible for a segment when it is in scope and either
/// reports the segment ONLINE, or reports it CONSUMING and the segment is its
/// partition's resolved consuming segment. Every other state excludes it.
/// Segments may end up with no eligible replica; that is a coverage gap, not
/// an error.
pub fn compute_eligible_replicas(
    external_view: &ExternalView,
    groups: &PartitionGroups,
    decisions: &BTreeMap<PartitionKey, ConsumingDecision>,
    scope: &InstanceScope,
) -> EligibilitySnapshot {
    let no_decision = ConsumingDecision::none();
    let mut entries = Vec::new();

    for (partition, group) in groups {
        let decision = decisions.get(partition).unwrap_or(&no_decision);

        for segment in group.segments() {
            let segment = segment.as_str();
            let mut eligible = BTreeSet::new();
            let mut out_of_scope = 0usize;

            for (instance, state) in external_view.replica_states(segment) {
                let allowed = match state {
                    ReplicaState::Online => true,
                    ReplicaState::Consuming => decision.allows_consuming(segment),
                    _ => false,
                };
                if !allowed {
                    continue;
                }

                if scope.contains(instance) {
                    eligible.insert(instance.clone());
                } else {
                    out_of_scope += 1;
                }
            }

            if out_of_scope > 0 {
                debug!(
                    segment,
                    out_of_scope, "Skipped replicas on instances outside the serving cluster"
                );
            }
            if eligible.is_empty() {
                warn!(
                    table = external_view.table_name(),
                    partition = %partition,
                    segment,
                    "Segment has no eligible replica"
                );
            }

            entries.push(SegmentReplicas {
                segment: segment.to_string(),
                eligible,
            });
        }
    }

    EligibilitySnapshot::new(external_view.table_name(), entries)
}
