//! Weighted replica assignment
//!
//! Builds one routing table from an eligibility snapshot. Segments are taken
//! smallest eligible set first, so segments pinned to one or two replicas are
//! placed before the flexible ones spend the balancing slack. Each segment
//! then goes to one eligible replica drawn at random, weighted by
//! `max_count - own_count` over the eligible replicas.
//!
//! For three replicas holding 1, 2 and 3 segments the candidate weightings are:
//!
//! | weight                   | P(1)   | P(2)   | P(3)   |
//! |--------------------------|--------|--------|--------|
//! | `sum - own`              | 0.4167 | 0.3333 | 0.2500 |
//! | `max - own + 1`          | 0.5000 | 0.3333 | 0.1667 |
//! | `max - own` (used here)  | 0.6667 | 0.3333 | 0.0000 |
//!
//! `max - own` never feeds the most loaded replica while a less loaded one is
//! eligible, and gives the lowest spread of per-replica segment counts of the three.

use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

use super::eligibility::EligibilitySnapshot;
use super::entity::RoutingTable;
use crate::cluster::InstanceId;

/// Running number of segments assigned to each instance in the table under construction
pub type AssignmentCounts = HashMap<InstanceId, usize>;

/// Build one routing table from an eligibility snapshot
pub fn assign_segments<R: Rng>(
    snapshot: &EligibilitySnapshot,
    rng: &mut R,
) -> RoutingTable {
    let mut ordered: Vec<_> = snapshot.entries().iter().collect();
    ordered.sort_by_key(|entry| entry.eligible.len());

    let mut table = RoutingTable::new();
    let mut counts = AssignmentCounts::new();
    let mut gaps = 0usize;

    for entry in ordered {
        let eligible: Vec<&InstanceId> = entry.eligible.iter().collect();

        let Some(replica) = pick_weighted_replica(&eligible, &counts, rng) else {
            gaps += 1;
            continue;
        };

        *counts.entry(replica.clone()).or_insert(0) += 1;
        table.assign(replica, entry.segment.clone());
    }

    if gaps > 0 {
        debug!(
            table = snapshot.table_name(),
            gaps, "Left segments without an eligible replica out of routing table"
        );
    }

    table
}

/// Pick one replica for a segment
///
/// Returns `None` when there is no eligible replica, the only replica when
/// there is one, and otherwise a replica drawn with weight
/// `max_count - own_count`. When every replica holds the same count the draw
/// is uniform.
pub fn pick_weighted_replica<R: Rng>(
    eligible: &[&InstanceId],
    counts: &AssignmentCounts,
    rng: &mut R,
) -> Option<InstanceId> {
    match eligible {
        [] => None,
        [only] => Some((*only).clone()),
        _ => {
            let replica_counts: Vec<usize> = eligible
                .iter()
                .map(|replica| counts.get(*replica).copied().unwrap_or(0))
                .collect();
            let max_count = replica_counts.iter().copied().max().unwrap_or(0);
            let weights: Vec<usize> = replica_counts
                .iter()
                .map(|count| max_count - count)
                .collect();

            let index = pick_index_by_weight(&weights, rng);
            Some(eligible[index].clone())
        }
    }
}

/// Draw an index with probability proportional to its weight, or uniformly
/// when all weights are zero. `weights` must not be empty.
fn pick_index_by_weight<R: Rng>(weights: &[usize], rng: &mut R) -> usize {
    let total: usize = weights.iter().sum();
    if total == 0 {
        return rng.gen_range(0..weights.len());
    }

    let mut remaining = rng.gen_range(0..total);
    for (index, &weight) in weights.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        if remaining < weight {
            return index;
        }
        remaining -= weight;
    }

    // Not reached: the draw is below the total weight
    weights.iter().rposition(|&weight| weight > 0).unwrap_or(0)
}
