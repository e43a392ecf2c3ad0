//! Grouping of streaming segments by partition

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::cluster::{ExternalView, PartitionKey, SegmentName};

/// Segments of one partition, ordered by sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionGroup {
    segments: Vec<SegmentName>,
    /// True when at least one name had a malformed sequence number and the
    /// group fell back to lexicographic order
    degraded_ordering: bool,
}

impl PartitionGroup {
    pub fn segments(&self) -> &[SegmentName] {
        &self.segments
    }

    /// Highest-sequence segment of the partition
    pub fn last(&self) -> Option<&SegmentName> {
        self.segments.last()
    }

    pub fn has_degraded_ordering(&self) -> bool {
        self.degraded_ordering
    }
}

/// All partition groups of a table
pub type PartitionGroups = BTreeMap<PartitionKey, PartitionGroup>;

/// Group the streaming segments of an external view by partition
///
/// Segments from other naming families are skipped. Each group is sorted by
/// ascending sequence number with the full name as tie-break, so two segments
/// sharing a sequence number are both kept. If any name in a group has a
/// malformed sequence number the whole group is sorted lexicographically
/// instead; this is logged and never fails.
pub fn group_by_partition(external_view: &ExternalView) -> PartitionGroups {
    let mut by_partition: BTreeMap<PartitionKey, Vec<SegmentName>> = BTreeMap::new();
    let mut skipped = 0usize;

    for raw in external_view.segment_names() {
        match SegmentName::parse(raw) {
            Some(name) => by_partition
                .entry(name.partition().clone())
                .or_default()
                .push(name),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            table = external_view.table_name(),
            skipped, "Ignored segments outside the streaming family"
        );
    }

    by_partition
        .into_iter()
        .map(|(partition, segments)| {
            let group = sort_partition(&partition, segments);
            (partition, group)
        })
        .collect()
}

fn sort_partition(partition: &PartitionKey, segments: Vec<SegmentName>) -> PartitionGroup {
    let mut keyed = Vec::with_capacity(segments.len());
    let mut anomalies = Vec::new();

    for name in segments {
        match name.sequence_number() {
            Ok(sequence) => keyed.push((sequence, name)),
            Err(anomaly) => {
                anomalies.push(anomaly);
                keyed.push((0, name));
            }
        }
    }

    let degraded_ordering = !anomalies.is_empty();
    for anomaly in &anomalies {
        warn!(
            partition = %partition,
            segment = %anomaly.segment,
            sequence = %anomaly.raw,
            "Malformed sequence number, ordering partition lexicographically"
        );
    }

    if degraded_ordering {
        keyed.sort_by(|(_, a), (_, b)| a.as_str().cmp(b.as_str()));
    } else {
        keyed.sort_by(|(seq_a, a), (seq_b, b)| {
            seq_a.cmp(seq_b).then_with(|| a.as_str().cmp(b.as_str()))
        });
    }

    PartitionGroup {
        segments: keyed.into_iter().map(|(_, name)| name).collect(),
        degraded_ordering,
    }
}
