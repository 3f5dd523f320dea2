// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! End-to-end scenarios over the synchronization store: the canonical
//! two-node document, initial packets, pre-edges, and failure handling.
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use patchbay_graph::{Metadata, Value};
use patchbay_sync::{PropertyEntry, StoreError};

mod common;
use common::{assert_mirrors, meta, port, repeat_output_store};

#[test]
fn two_nodes_and_an_edge() {
    let mut store = repeat_output_store();
    store
        .add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();

    let snap = store.snapshot();
    let node_ids: Vec<&str> = snap.nodes.keys().map(|id| id.as_str()).collect();
    assert_eq!(node_ids, ["A", "B"]);
    assert_eq!(snap.node(&"A".into()).unwrap().component, "core/Repeat");

    let via_in = snap.edge_in(&port("B", "in"), &port("A", "out")).unwrap();
    let via_out = snap.edge_out(&port("A", "out"), &port("B", "in")).unwrap();
    assert!(Arc::ptr_eq(via_in, via_out));
    assert_eq!(via_out.metadata, meta());
    assert_mirrors(&snap);
}

#[test]
fn node_then_edge_removal_empties_both_indexes() {
    let mut store = repeat_output_store();
    store
        .add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();

    store.remove_node(&"A".into()).unwrap();
    store.remove_edge(&port("A", "out"), &port("B", "in"));

    let snap = store.snapshot();
    assert!(snap.edges_in.is_empty());
    assert!(snap.edges_out.is_empty());
    let node_ids: Vec<&str> = snap.nodes.keys().map(|id| id.as_str()).collect();
    assert_eq!(node_ids, ["B"]);
}

#[test]
fn edge_then_node_removal_empties_both_indexes() {
    let mut store = repeat_output_store();
    store
        .add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();

    store.remove_edge(&port("A", "out"), &port("B", "in"));
    store.remove_node(&"A".into()).unwrap();

    let snap = store.snapshot();
    assert!(snap.edges_in.is_empty());
    assert!(snap.edges_out.is_empty());
    let node_ids: Vec<&str> = snap.nodes.keys().map(|id| id.as_str()).collect();
    assert_eq!(node_ids, ["B"]);
}

#[test]
fn initial_packet_roundtrip() {
    let mut store = repeat_output_store();
    store
        .add_initial(Value::from(42), port("B", "in"), meta())
        .unwrap();

    let snap = store.snapshot();
    let packet = snap.initial(&"B".into(), &"in".into()).unwrap();
    assert_eq!(packet.data, Value::from(42));
    assert_eq!(packet.metadata, meta());

    store.remove_initial(&port("B", "in"));
    let snap = store.snapshot();
    assert!(snap.property("B").is_none());
}

#[test]
fn pre_edge_tracks_the_fixed_endpoint() {
    let mut store = repeat_output_store();
    store
        .add_pre_edge(None, Some(&port("B", "in")), meta())
        .unwrap();

    let snap = store.snapshot();
    assert!(snap.pre_edge_in(&"B".into(), &"in".into()).is_some());
    assert!(snap.pre_edges_out.is_empty());

    store.remove_pre_edge(None, Some(&port("B", "in")));
    let snap = store.snapshot();
    assert!(snap.pre_edges_in.is_empty());
    assert!(snap.pre_edges_out.is_empty());
}

#[test]
fn pre_edge_with_only_the_outbound_endpoint() {
    let mut store = repeat_output_store();
    store
        .add_pre_edge(Some(&port("A", "out")), None, meta())
        .unwrap();

    let snap = store.snapshot();
    assert!(snap.pre_edge_out(&"A".into(), &"out".into()).is_some());
    assert!(snap.pre_edges_in.is_empty());

    store.remove_pre_edge(Some(&port("A", "out")), None);
    assert!(store.snapshot().pre_edges_out.is_empty());
}

#[test]
fn pre_edge_with_no_endpoint_is_rejected() {
    let mut store = repeat_output_store();
    let before = store.snapshot();
    assert_eq!(
        store.add_pre_edge(None, None, meta()),
        Err(StoreError::PreEdgeEndpointMissing)
    );
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn rejected_mutation_leaves_the_snapshot_untouched() {
    let mut store = repeat_output_store();
    let before = store.snapshot();

    let err = store.add_node("A".into(), "core/Split", meta());
    assert!(matches!(err, Err(StoreError::Graph(_))));
    // Not merely equal: the very same tree, no replacement happened.
    assert!(Arc::ptr_eq(&before, &store.snapshot()));

    let err = store.set_edge_metadata(&port("A", "out"), &port("B", "in"), meta());
    assert!(matches!(err, Err(StoreError::Graph(_))));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn indexed_variants_fail_fast() {
    let mut store = repeat_output_store();
    let before = store.snapshot();
    assert_eq!(
        store.add_edge_index(port("A", "out"), Some(0), port("B", "in"), Some(1), meta()),
        Err(StoreError::Unsupported("add_edge_index"))
    );
    assert_eq!(
        store.add_initial_index(Value::from(1), port("B", "in"), Some(0), meta()),
        Err(StoreError::Unsupported("add_initial_index"))
    );
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn edge_selection_lives_in_both_mirrors() {
    let mut store = repeat_output_store();
    store
        .add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();

    store.select_edge(&port("A", "out"), &port("B", "in"));
    let snap = store.snapshot();
    assert!(snap.edge_out(&port("A", "out"), &port("B", "in")).unwrap().selected);
    assert!(snap.edge_in(&port("B", "in"), &port("A", "out")).unwrap().selected);
    assert_mirrors(&snap);
    // Node selection is untouched; edge selection is edge-scoped.
    assert!(!snap.node(&"A".into()).unwrap().selected);
    assert!(!snap.node(&"B".into()).unwrap().selected);

    store.unselect_edge(&port("A", "out"), &port("B", "in"));
    let snap = store.snapshot();
    assert!(!snap.edge_out(&port("A", "out"), &port("B", "in")).unwrap().selected);
}

#[test]
fn set_properties_replaces_each_name_independently() {
    let mut store = repeat_output_store();
    store.set_properties(
        [
            ("name".to_owned(), Value::from("demo")),
            ("rev".to_owned(), Value::from(1)),
        ]
        .into(),
    );
    store.set_properties([("rev".to_owned(), Value::from(2))].into());

    let snap = store.snapshot();
    assert_eq!(
        snap.property("name"),
        Some(&PropertyEntry::Value(Value::from("demo")))
    );
    assert_eq!(
        snap.property("rev"),
        Some(&PropertyEntry::Value(Value::from(2)))
    );
}

#[test]
fn rename_keeps_edge_keys_on_the_old_id() {
    let mut store = repeat_output_store();
    store
        .add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();
    store.rename_node(&"A".into(), "A2".into()).unwrap();

    let snap = store.snapshot();
    assert!(snap.node(&"A".into()).is_none());
    assert!(snap.node(&"A2".into()).is_some());
    // Documented limitation: the edge still hangs off the old id, in both
    // representations.
    assert!(snap.edge_out(&port("A", "out"), &port("B", "in")).is_some());
    assert!(store
        .graph()
        .edge_metadata(&port("A", "out"), &port("B", "in"))
        .is_some());
}

#[test]
fn bulk_load_replays_existing_graph_content() {
    let mut seed = patchbay_graph::Graph::new();
    seed.add_node("A".into(), "core/Repeat", meta()).unwrap();
    seed.add_node("B".into(), "core/Output", meta()).unwrap();
    seed.add_edge(port("A", "out"), port("B", "in"), meta())
        .unwrap();
    seed.add_initial(Value::from(7), port("B", "in"), meta())
        .unwrap();
    seed.set_properties([("name".to_owned(), Value::from("seeded"))].into());

    let store = patchbay_sync::SnapshotStore::new(seed);
    let snap = store.snapshot();
    assert_eq!(snap.nodes.len(), 2);
    assert!(snap.edge_out(&port("A", "out"), &port("B", "in")).is_some());
    assert_eq!(
        snap.initial(&"B".into(), &"in".into()).unwrap().data,
        Value::from(7)
    );
    assert_eq!(
        snap.property("name"),
        Some(&PropertyEntry::Value(Value::from("seeded")))
    );
    assert_mirrors(&snap);
}

#[test]
fn metadata_values_flow_through() {
    let mut store = repeat_output_store();
    let mut metadata = Metadata::new();
    metadata.insert("x".to_owned(), Value::from(120));
    metadata.insert("y".to_owned(), Value::from(80));
    store
        .add_edge(port("A", "out"), port("B", "in"), metadata.clone())
        .unwrap();

    let snap = store.snapshot();
    assert_eq!(
        snap.edge_out(&port("A", "out"), &port("B", "in")).unwrap().metadata,
        metadata
    );
}
