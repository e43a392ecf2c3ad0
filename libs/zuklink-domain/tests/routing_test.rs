//! Integration tests for routing table construction
//!
//! These tests verify that:
//! 1. At most one segment per partition is ever served from CONSUMING replicas
//! 2. Every assignment goes to an eligible replica
//! 3. Segments with a single eligible replica are pinned to it in every table
//! 4. Segments without an eligible replica are left out without side effects
//! 5. The configured number of tables is always returned

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use zuklink_domain::cluster::{ExternalView, InstanceConfig, InstanceId, ReplicaState, SegmentName};
use zuklink_domain::routing::{
    BuilderConfig, LowLevelConsumerRoutingTableBuilder, RoutingSettings, RoutingTableBuilder,
    RoutingTableSet,
};

const TABLE: &str = "events_REALTIME";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn segment(partition: &str, sequence: u32) -> String {
    format!("{TABLE}__{partition}__{sequence}__20160101T0000Z")
}

fn instances(ids: &[&str]) -> Vec<InstanceConfig> {
    ids.iter().map(|id| InstanceConfig::new(*id)).collect()
}

fn seeded_builder(seed: u64, table_count: usize) -> LowLevelConsumerRoutingTableBuilder {
    LowLevelConsumerRoutingTableBuilder::with_settings(RoutingSettings {
        table_count,
        random_seed: Some(seed),
    })
}

/// Test the documented three-segment flush scenario end to end
#[test]
fn test_partition_mid_flush_end_to_end() {
    init_tracing();

    let mut view = ExternalView::new(TABLE);
    for sequence in [0, 1] {
        for instance in ["A", "B", "C"] {
            view.set_state(segment("P1", sequence), instance, "ONLINE");
        }
    }
    view.set_state(segment("P1", 2), "A", "CONSUMING");
    view.set_state(segment("P1", 2), "B", "CONSUMING");
    view.set_state(segment("P1", 2), "C", "ERROR");

    let builder = LowLevelConsumerRoutingTableBuilder::new();
    let configs = instances(&["A", "B", "C"]);

    let snapshot = builder.compute_eligibility(&view, &configs).unwrap();
    let all: BTreeSet<InstanceId> = ["A", "B", "C"].into_iter().map(InstanceId::from).collect();
    let consuming: BTreeSet<InstanceId> = ["A", "B"].into_iter().map(InstanceId::from).collect();
    assert_eq!(snapshot.eligible_replicas(&segment("P1", 0)), Some(&all));
    assert_eq!(snapshot.eligible_replicas(&segment("P1", 1)), Some(&all));
    assert_eq!(snapshot.eligible_replicas(&segment("P1", 2)), Some(&consuming));

    let set = builder.compute_routing_tables(&view, &configs).unwrap();
    assert_eq!(set.len(), 10);

    for table in set.tables() {
        let holder = table.instance_for(&segment("P1", 2)).unwrap();
        assert!(consuming.contains(holder), "consuming segment on {holder}");

        // Three segments over three replicas always end up one each
        assert_eq!(table.segment_count(), 3);
        assert_eq!(table.instances().count(), 3);
        assert!(table.segment_counts().values().all(|&count| count == 1));
    }
}

/// Test that a segment with one eligible replica lands there in every table
#[test]
fn test_single_replica_is_pinned_in_every_table() {
    init_tracing();

    let mut view = ExternalView::new(TABLE);
    view.set_state(segment("0", 0), "A", "ONLINE");
    view.set_state(segment("0", 0), "B", "ERROR");
    for sequence in 1..6 {
        view.set_state(segment("0", sequence), "A", "ONLINE");
        view.set_state(segment("0", sequence), "B", "ONLINE");
    }

    let set = LowLevelConsumerRoutingTableBuilder::new()
        .compute_routing_tables(&view, &instances(&["A", "B"]))
        .unwrap();

    for table in set.tables() {
        assert_eq!(table.instance_for(&segment("0", 0)), Some(&InstanceId::new("A")));
    }
}

/// Test that an unservable segment is absent everywhere and nothing else is lost
#[test]
fn test_coverage_gap_is_isolated() {
    init_tracing();

    let mut view = ExternalView::new(TABLE);
    view.set_state(segment("0", 0), "A", "ONLINE");
    view.set_state(segment("1", 0), "A", "ERROR");
    view.set_state(segment("1", 0), "B", "OFFLINE");
    view.set_state(segment("2", 0), "B", "CONSUMING");

    let set = seeded_builder(3, 10)
        .compute_routing_tables(&view, &instances(&["A", "B"]))
        .unwrap();

    assert_eq!(set.unassignable_segments(), [segment("1", 0)]);
    for table in set.tables() {
        assert_eq!(table.instance_for(&segment("1", 0)), None);
        assert_eq!(table.instance_for(&segment("0", 0)), Some(&InstanceId::new("A")));
        assert_eq!(table.instance_for(&segment("2", 0)), Some(&InstanceId::new("B")));
    }
}

/// Test that degenerate inputs still produce the configured number of tables
#[test]
fn test_table_count_holds_for_degenerate_input() {
    init_tracing();

    let mut all_ineligible = ExternalView::new(TABLE);
    all_ineligible.set_state(segment("0", 0), "A", "ERROR");
    all_ineligible.set_state(segment("0", 1), "A", "DROPPED");

    let mut builder = LowLevelConsumerRoutingTableBuilder::new();
    builder
        .init(&BuilderConfig::new().with("routing.table.count", 7))
        .unwrap();

    for (view, configs) in [
        (all_ineligible.clone(), instances(&["A"])),
        (ExternalView::new(TABLE), instances(&["A", "B"])),
        (all_ineligible, Vec::new()),
    ] {
        let set = builder.compute_routing_tables(&view, &configs).unwrap();
        assert_eq!(set.len(), 7);
        assert!(set.tables().iter().all(|table| table.is_empty()));
    }
}

/// Test that an empty instance list routes nothing, even with ONLINE replicas
#[test]
fn test_empty_cluster_routes_nothing() {
    let mut view = ExternalView::new(TABLE);
    view.set_state(segment("0", 0), "A", "ONLINE");

    let set = LowLevelConsumerRoutingTableBuilder::new()
        .compute_routing_tables(&view, &[])
        .unwrap();

    assert_eq!(set.len(), 10);
    assert!(set.tables().iter().all(|table| table.is_empty()));
    assert_eq!(set.unassignable_segments(), [segment("0", 0)]);
}

/// Test that batch segments sharing the view are never routed by this builder
#[test]
fn test_non_streaming_segments_are_not_routed() {
    let mut view = ExternalView::new(TABLE);
    view.set_state("events_OFFLINE_2016-01-01_2016-01-02_0", "A", "ONLINE");
    view.set_state(segment("0", 0), "A", "ONLINE");

    let set = seeded_builder(1, 2)
        .compute_routing_tables(&view, &instances(&["A"]))
        .unwrap();

    for table in set.tables() {
        assert_eq!(table.segment_count(), 1);
        assert_eq!(table.instance_for("events_OFFLINE_2016-01-01_2016-01-02_0"), None);
    }
}

fn random_view(rng: &mut StdRng, instance_ids: &[&str]) -> ExternalView {
    const STATES: [&str; 6] = ["ONLINE", "CONSUMING", "consuming", "ERROR", "OFFLINE", "???"];
    let mut view = ExternalView::new(TABLE);

    for partition in 0..rng.gen_range(1..6) {
        for sequence in 0..rng.gen_range(1..7) {
            for instance in instance_ids {
                if rng.gen_bool(0.8) {
                    let state = STATES[rng.gen_range(0..STATES.len())];
                    view.set_state(segment(&partition.to_string(), sequence), *instance, state);
                }
            }
        }
    }

    view
}

fn check_invariants(view: &ExternalView, set: &RoutingTableSet) {
    for table in set.tables() {
        let mut consuming_by_partition: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut seen = BTreeSet::new();

        for (instance, segments) in table.iter() {
            for name in segments {
                assert!(seen.insert(name.clone()), "{name} assigned twice in one table");

                let state = view
                    .replica_states(name)
                    .find(|(holder, _)| *holder == instance)
                    .map(|(_, state)| state)
                    .unwrap();

                match state {
                    ReplicaState::Online => {}
                    ReplicaState::Consuming => {
                        let parsed = SegmentName::parse(name).unwrap();
                        // The segment must not have any ONLINE replica
                        assert!(view
                            .replica_states(name)
                            .all(|(_, state)| state != ReplicaState::Online));
                        consuming_by_partition
                            .entry(parsed.partition().to_string())
                            .or_default()
                            .insert(name.clone());
                    }
                    other => panic!("{name} routed to {instance} in state {other:?}"),
                }
            }
        }

        for (partition, segments) in consuming_by_partition {
            assert!(
                segments.len() <= 1,
                "partition {partition} served from consuming replicas of {segments:?}"
            );
        }

        // Every segment that has an eligible replica is routed exactly once
        let routable = view.segment_count() - set.unassignable_segments().len();
        assert_eq!(seen.len(), routable);
    }
}

/// Test the routing invariants over many random cluster states
#[test]
fn test_invariants_hold_for_random_clusters() {
    init_tracing();

    let instance_ids = ["S1", "S2", "S3", "S4"];
    let configs = instances(&instance_ids);
    let mut rng = StdRng::seed_from_u64(2016);

    for round in 0..200 {
        let view = random_view(&mut rng, &instance_ids);
        let set = seeded_builder(round, 5)
            .compute_routing_tables(&view, &configs)
            .unwrap();

        assert_eq!(set.len(), 5);
        check_invariants(&view, &set);
    }
}
