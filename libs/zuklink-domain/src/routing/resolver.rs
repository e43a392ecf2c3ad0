//! Resolution of the one segment per partition that may be served while consuming

use std::collections::BTreeMap;
use tracing::debug;

use super::grouper::PartitionGroups;
use crate::cluster::{ExternalView, PartitionKey, ReplicaState};

/// Per-partition decision on which segment, if any, may be served from
/// replicas still in CONSUMING state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumingDecision {
    consuming_segment: Option<String>,
}

impl ConsumingDecision {
    /// No segment of the partition may use CONSUMING replicas
    pub fn none() -> Self {
        Self {
            consuming_segment: None,
        }
    }

    pub fn segment(segment: impl Into<String>) -> Self {
        Self {
            consuming_segment: Some(segment.into()),
        }
    }

    pub fn consuming_segment(&self) -> Option<&str> {
        self.consuming_segment.as_deref()
    }

    /// Whether CONSUMING replicas of `segment` may serve queries
    pub fn allows_consuming(&self, segment: &str) -> bool {
        self.consuming_segment.as_deref() == Some(segment)
    }
}

/// Decide, for every partition, whether its last segment may be served from
/// CONSUMING replicas
///
/// Only the last segment of a partition is inspected. If any replica already
/// reports it ONLINE the partition has flushed and must be served from ONLINE
/// replicas only. Otherwise every reporting replica is CONSUMING, ERROR or in
/// a state that grants nothing, and the last segment becomes the partition's
/// single consuming segment. A partially flushed segment is never served from
/// a mix of CONSUMING and ONLINE replicas.
pub fn resolve_consuming_segments(
    external_view: &ExternalView,
    groups: &PartitionGroups,
) -> BTreeMap<PartitionKey, ConsumingDecision> {
    groups
        .iter()
        .map(|(partition, group)| {
            let decision = match group.last() {
                Some(last) => {
                    let flushed = external_view
                        .replica_states(last.as_str())
                        .any(|(_, state)| state == ReplicaState::Online);

                    if flushed {
                        ConsumingDecision::none()
                    } else {
                        ConsumingDecision::segment(last.as_str())
                    }
                }
                None => ConsumingDecision::none(),
            };

            debug!(
                partition = %partition,
                consuming_segment = ?decision.consuming_segment(),
                "Resolved consuming segment"
            );

            (partition.clone(), decision)
        })
        .collect()
}
