// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! Shared helpers for the synchronization integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use patchbay_graph::{Graph, Metadata, PortRef};
use patchbay_sync::{EdgeIndex, PropertyEntry, Snapshot, SnapshotStore};

/// Empty metadata, the common case in these tests.
pub fn meta() -> Metadata {
    Metadata::new()
}

/// Shorthand for an edge endpoint.
pub fn port(node: &str, port: &str) -> PortRef {
    PortRef::new(node, port)
}

/// A store holding the two-node fixture used across scenarios:
/// `A` (core/Repeat) and `B` (core/Output).
pub fn repeat_output_store() -> SnapshotStore {
    let mut store = SnapshotStore::new(Graph::new());
    store.add_node("A".into(), "core/Repeat", meta()).unwrap();
    store.add_node("B".into(), "core/Output", meta()).unwrap();
    store
}

fn leaf_count(index: &EdgeIndex) -> usize {
    index
        .values()
        .flat_map(|ports| ports.values())
        .flat_map(|peers| peers.values())
        .map(|leaves| leaves.len())
        .sum()
}

/// Asserts the mirror invariant: every entry of `edges_in` has a
/// reference-identical leaf under the inverse key order in `edges_out`, and
/// both indexes hold the same number of edges.
pub fn assert_mirrors(snap: &Snapshot) {
    let mut seen = 0;
    for (in_node, in_ports) in snap.edges_in.iter() {
        for (in_port, peers) in in_ports.iter() {
            for (out_node, out_ports) in peers.iter() {
                for (out_port, leaf) in out_ports.iter() {
                    seen += 1;
                    let from = PortRef::new(out_node.clone(), out_port.clone());
                    let to = PortRef::new(in_node.clone(), in_port.clone());
                    let mirror = snap
                        .edge_out(&from, &to)
                        .unwrap_or_else(|| panic!("missing mirror for {from} -> {to}"));
                    assert!(
                        Arc::ptr_eq(leaf, mirror),
                        "mirror leaves diverged for {from} -> {to}"
                    );
                }
            }
        }
    }
    assert_eq!(seen, leaf_count(&snap.edges_out), "edge counts diverged");
}

/// Asserts that no intermediate container anywhere in the snapshot is empty.
pub fn assert_no_empty_containers(snap: &Snapshot) {
    for index in [&snap.edges_in, &snap.edges_out] {
        for ports in index.values() {
            assert!(!ports.is_empty());
            for peers in ports.values() {
                assert!(!peers.is_empty());
                for leaves in peers.values() {
                    assert!(!leaves.is_empty());
                }
            }
        }
    }
    for index in [&snap.pre_edges_in, &snap.pre_edges_out] {
        for ports in index.values() {
            assert!(!ports.is_empty());
        }
    }
    for entry in snap.properties.values() {
        if let PropertyEntry::Initials(ports) = entry {
            assert!(!ports.is_empty());
        }
    }
}
