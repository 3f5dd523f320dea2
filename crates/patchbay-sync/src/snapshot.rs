// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! The immutable snapshot tree and its per-mutation update methods.
//!
//! A [`Snapshot`] mirrors the live graph's content as a persistent tree:
//! every container is an `Arc`-shared ordered map, and each update method
//! returns a new value that shares all unmodified subtrees with its
//! predecessor. A rendering consumer holding two snapshots can therefore
//! decide "did this part change?" with [`Arc::ptr_eq`] on the corresponding
//! subtree, at any depth, without deep equality.
//!
//! Shape contract (stable; renderers key off it):
//! - `nodes`: node id → [`NodeView`]
//! - `edges_in`: to-node → to-port → from-node → from-port → [`EdgeView`]
//! - `edges_out`: from-node → from-port → to-node → to-port → [`EdgeView`] —
//!   the mirror index of the same edges, inverse key order, kept for O(1)
//!   lookup from either endpoint. Both mirrors hold the **same** leaf `Arc`.
//! - `initializers` / `properties`: see the field docs; `properties` is
//!   shared by node-keyed initial packets and name-keyed graph properties.
//! - `pre_edges_in` / `pre_edges_out`: the in-progress edge being dragged,
//!   keyed by whichever endpoint is already fixed.
//!
//! Update methods that remove or toggle state return `Option<Self>` with
//! `None` meaning "nothing changed": the store then keeps the previous
//! snapshot reference, so no-ops never signal a change.

use std::sync::Arc;

use patchbay_graph::{Metadata, NodeId, PortId, PortRef, Value};

use crate::persist::{
    assoc, assoc2, assoc4, dissoc, dissoc2, dissoc4, get2, get4, update, update4, Shared,
};

/// Snapshot view of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    /// Name of the component the node instantiates.
    pub component: String,
    /// Opaque editor metadata.
    pub metadata: Metadata,
    /// Whether the node is part of the current selection.
    pub selected: bool,
}

/// Snapshot view of one edge, stored identically in both mirror indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView {
    /// Opaque editor metadata.
    pub metadata: Metadata,
    /// Whether the edge is part of the current selection.
    ///
    /// Selection is scoped to the edge's four-key identity, not to either
    /// node; both mirrors carry the flag inside the shared leaf.
    pub selected: bool,
}

/// Snapshot view of one initial information packet.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialView {
    /// The packet payload.
    pub data: Value,
    /// Opaque editor metadata.
    pub metadata: Metadata,
}

/// One entry of the `properties` category.
///
/// The category is shared by two writers with different key spaces:
/// `add_initial` stores packets under the **node id**, `set_properties`
/// stores graph-level values under the **property name**. The last writer
/// per key wins, matching the behavior the editor has always had.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyEntry {
    /// Initial packets for one node, keyed by inport.
    Initials(Shared<PortId, Arc<InitialView>>),
    /// A graph-level property value.
    Value(Value),
}

/// Node category: id → view.
pub type NodeMap = Shared<NodeId, Arc<NodeView>>;
/// Four-level edge index (either key order; see [`Snapshot`] shape contract).
pub type EdgeIndex = Shared<NodeId, Shared<PortId, Shared<NodeId, Shared<PortId, Arc<EdgeView>>>>>;
/// Initializer category: node → port → packet view.
pub type InitialIndex = Shared<NodeId, Shared<PortId, Arc<InitialView>>>;
/// Properties category: key → entry.
pub type PropertyMap = Shared<String, PropertyEntry>;
/// Pre-edge category: fixed endpoint node → port → metadata.
pub type PreEdgeIndex = Shared<NodeId, Shared<PortId, Arc<Metadata>>>;

/// Immutable, structurally shared mirror of the live graph.
///
/// Constructed empty, then only ever replaced wholesale by
/// [`crate::SnapshotStore`]; holding an `Arc<Snapshot>` across store
/// operations is safe and cheap, and the held tree never changes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Snapshot {
    /// All nodes.
    pub nodes: NodeMap,
    /// Edges indexed from their inbound endpoint.
    pub edges_in: EdgeIndex,
    /// Edges indexed from their outbound endpoint (mirror of `edges_in`).
    pub edges_out: EdgeIndex,
    /// Reserved initializer category. No operation currently writes it;
    /// packets land in `properties` under their node id (see
    /// [`PropertyEntry`]).
    pub initializers: InitialIndex,
    /// Initial packets (node-keyed) and graph properties (name-keyed).
    pub properties: PropertyMap,
    /// In-progress edge whose inbound endpoint is fixed.
    pub pre_edges_in: PreEdgeIndex,
    /// In-progress edge whose outbound endpoint is fixed.
    pub pre_edges_out: PreEdgeIndex,
}

impl Snapshot {
    /// Creates an empty snapshot with every category allocated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── read access ─────────────────────────────────────────────────

    /// Returns the view of node `id`, if present.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Arc<NodeView>> {
        self.nodes.get(id)
    }

    /// Looks an edge up from its outbound endpoint.
    #[must_use]
    pub fn edge_out(&self, from: &PortRef, to: &PortRef) -> Option<&Arc<EdgeView>> {
        get4(&self.edges_out, &from.node, &from.port, &to.node, &to.port)
    }

    /// Looks an edge up from its inbound endpoint.
    #[must_use]
    pub fn edge_in(&self, to: &PortRef, from: &PortRef) -> Option<&Arc<EdgeView>> {
        get4(&self.edges_in, &to.node, &to.port, &from.node, &from.port)
    }

    /// Returns the initial packet feeding `node`/`port`, if present.
    #[must_use]
    pub fn initial(&self, node: &NodeId, port: &PortId) -> Option<&Arc<InitialView>> {
        match self.properties.get(node.as_str())? {
            PropertyEntry::Initials(ports) => ports.get(port),
            PropertyEntry::Value(_) => None,
        }
    }

    /// Returns the `properties` entry stored under `key`, if present.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyEntry> {
        self.properties.get(key)
    }

    /// Returns the pending pre-edge fixed at inbound `node`/`port`.
    #[must_use]
    pub fn pre_edge_in(&self, node: &NodeId, port: &PortId) -> Option<&Arc<Metadata>> {
        get2(&self.pre_edges_in, node, port)
    }

    /// Returns the pending pre-edge fixed at outbound `node`/`port`.
    #[must_use]
    pub fn pre_edge_out(&self, node: &NodeId, port: &PortId) -> Option<&Arc<Metadata>> {
        get2(&self.pre_edges_out, node, port)
    }

    // ── identity comparison for diff consumers ──────────────────────

    /// `true` if the node category is reference-identical in both snapshots.
    #[must_use]
    pub fn same_nodes(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// `true` if the inbound edge index is reference-identical in both
    /// snapshots.
    #[must_use]
    pub fn same_edges_in(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.edges_in, &other.edges_in)
    }

    /// `true` if the outbound edge index is reference-identical in both
    /// snapshots.
    #[must_use]
    pub fn same_edges_out(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.edges_out, &other.edges_out)
    }

    /// `true` if the properties category is reference-identical in both
    /// snapshots.
    #[must_use]
    pub fn same_properties(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }

    /// `true` if both pre-edge categories are reference-identical in both
    /// snapshots.
    #[must_use]
    pub fn same_pre_edges(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pre_edges_in, &other.pre_edges_in)
            && Arc::ptr_eq(&self.pre_edges_out, &other.pre_edges_out)
    }

    // ── node updates ────────────────────────────────────────────────

    pub(crate) fn with_node(&self, id: &NodeId, component: &str, metadata: &Metadata) -> Self {
        let view = Arc::new(NodeView {
            component: component.to_owned(),
            metadata: metadata.clone(),
            selected: false,
        });
        Self {
            nodes: assoc(&self.nodes, id.clone(), view),
            ..self.clone()
        }
    }

    pub(crate) fn without_node(&self, id: &NodeId) -> Option<Self> {
        Some(Self {
            nodes: dissoc(&self.nodes, id)?,
            ..self.clone()
        })
    }

    /// Moves the view stored under `old` to the key `new`, preserving the
    /// view's identity. Edge and initializer keys referencing `old` are left
    /// untouched (the live graph has the same limitation).
    pub(crate) fn with_node_renamed(&self, old: &NodeId, new: &NodeId) -> Option<Self> {
        let view = Arc::clone(self.nodes.get(old)?);
        Some(Self {
            nodes: assoc(&dissoc(&self.nodes, old)?, new.clone(), view),
            ..self.clone()
        })
    }

    pub(crate) fn with_node_metadata(&self, id: &NodeId, metadata: &Metadata) -> Option<Self> {
        let nodes = update(&self.nodes, id, |view| {
            Some(Arc::new(NodeView {
                metadata: metadata.clone(),
                ..(**view).clone()
            }))
        })?;
        Some(Self {
            nodes,
            ..self.clone()
        })
    }

    /// Sets the node's selection flag; `None` when the node is absent or the
    /// flag already has the requested value.
    pub(crate) fn with_node_selected(&self, id: &NodeId, selected: bool) -> Option<Self> {
        let nodes = update(&self.nodes, id, |view| {
            if view.selected == selected {
                return None;
            }
            Some(Arc::new(NodeView {
                selected,
                ..(**view).clone()
            }))
        })?;
        Some(Self {
            nodes,
            ..self.clone()
        })
    }

    // ── edge updates (always both mirrors together) ─────────────────

    /// Inserts the edge into both mirrors with one shared leaf. Re-adding an
    /// existing edge replaces the leaf, which resets its selection flag.
    pub(crate) fn with_edge(&self, from: &PortRef, to: &PortRef, metadata: &Metadata) -> Self {
        let leaf = Arc::new(EdgeView {
            metadata: metadata.clone(),
            selected: false,
        });
        Self {
            edges_in: assoc4(
                &self.edges_in,
                &to.node,
                &to.port,
                &from.node,
                &from.port,
                Arc::clone(&leaf),
            ),
            edges_out: assoc4(
                &self.edges_out,
                &from.node,
                &from.port,
                &to.node,
                &to.port,
                leaf,
            ),
            ..self.clone()
        }
    }

    pub(crate) fn without_edge(&self, from: &PortRef, to: &PortRef) -> Option<Self> {
        let edges_in = dissoc4(&self.edges_in, &to.node, &to.port, &from.node, &from.port);
        let edges_out = dissoc4(&self.edges_out, &from.node, &from.port, &to.node, &to.port);
        if edges_in.is_none() && edges_out.is_none() {
            return None;
        }
        Some(Self {
            edges_in: edges_in.unwrap_or_else(|| Arc::clone(&self.edges_in)),
            edges_out: edges_out.unwrap_or_else(|| Arc::clone(&self.edges_out)),
            ..self.clone()
        })
    }

    pub(crate) fn with_edge_metadata(
        &self,
        from: &PortRef,
        to: &PortRef,
        metadata: &Metadata,
    ) -> Option<Self> {
        let current = self.edge_out(from, to)?;
        let leaf = Arc::new(EdgeView {
            metadata: metadata.clone(),
            selected: current.selected,
        });
        self.replace_edge_leaf(from, to, leaf)
    }

    /// Sets the edge's selection flag; `None` when the edge is absent or the
    /// flag already has the requested value.
    pub(crate) fn with_edge_selected(
        &self,
        from: &PortRef,
        to: &PortRef,
        selected: bool,
    ) -> Option<Self> {
        let current = self.edge_out(from, to)?;
        if current.selected == selected {
            return None;
        }
        let leaf = Arc::new(EdgeView {
            metadata: current.metadata.clone(),
            selected,
        });
        self.replace_edge_leaf(from, to, leaf)
    }

    fn replace_edge_leaf(
        &self,
        from: &PortRef,
        to: &PortRef,
        leaf: Arc<EdgeView>,
    ) -> Option<Self> {
        let edges_in = update4(
            &self.edges_in,
            &to.node,
            &to.port,
            &from.node,
            &from.port,
            |_| Some(Arc::clone(&leaf)),
        )?;
        let edges_out = update4(
            &self.edges_out,
            &from.node,
            &from.port,
            &to.node,
            &to.port,
            |_| Some(leaf),
        )?;
        Some(Self {
            edges_in,
            edges_out,
            ..self.clone()
        })
    }

    // ── initial packets and properties ──────────────────────────────

    pub(crate) fn with_initial(
        &self,
        node: &NodeId,
        port: &PortId,
        data: &Value,
        metadata: &Metadata,
    ) -> Self {
        let view = Arc::new(InitialView {
            data: data.clone(),
            metadata: metadata.clone(),
        });
        let ports = match self.properties.get(node.as_str()) {
            Some(PropertyEntry::Initials(ports)) => Arc::clone(ports),
            // Absent, or a name-keyed property shadowing this node id: start
            // a fresh port map (last writer wins).
            _ => Arc::default(),
        };
        let ports = assoc(&ports, port.clone(), view);
        Self {
            properties: assoc(
                &self.properties,
                node.as_str().to_owned(),
                PropertyEntry::Initials(ports),
            ),
            ..self.clone()
        }
    }

    pub(crate) fn without_initial(&self, node: &NodeId, port: &PortId) -> Option<Self> {
        let Some(PropertyEntry::Initials(ports)) = self.properties.get(node.as_str()) else {
            return None;
        };
        if !ports.contains_key(port) {
            return None;
        }
        let properties = if ports.len() < 2 {
            // Last packet for this node: prune the node entry entirely.
            dissoc(&self.properties, &node.as_str().to_owned())?
        } else {
            assoc(
                &self.properties,
                node.as_str().to_owned(),
                PropertyEntry::Initials(dissoc(ports, port)?),
            )
        };
        Some(Self {
            properties,
            ..self.clone()
        })
    }

    pub(crate) fn with_property(&self, name: &str, value: &Value) -> Self {
        Self {
            properties: assoc(
                &self.properties,
                name.to_owned(),
                PropertyEntry::Value(value.clone()),
            ),
            ..self.clone()
        }
    }

    // ── pre-edges ───────────────────────────────────────────────────

    pub(crate) fn with_pre_edge_in(
        &self,
        node: &NodeId,
        port: &PortId,
        metadata: &Metadata,
    ) -> Self {
        Self {
            pre_edges_in: assoc2(
                &self.pre_edges_in,
                node,
                port,
                Arc::new(metadata.clone()),
            ),
            ..self.clone()
        }
    }

    pub(crate) fn with_pre_edge_out(
        &self,
        node: &NodeId,
        port: &PortId,
        metadata: &Metadata,
    ) -> Self {
        Self {
            pre_edges_out: assoc2(
                &self.pre_edges_out,
                node,
                port,
                Arc::new(metadata.clone()),
            ),
            ..self.clone()
        }
    }

    pub(crate) fn without_pre_edge_in(&self, node: &NodeId, port: &PortId) -> Option<Self> {
        Some(Self {
            pre_edges_in: dissoc2(&self.pre_edges_in, node, port)?,
            ..self.clone()
        })
    }

    pub(crate) fn without_pre_edge_out(&self, node: &NodeId, port: &PortId) -> Option<Self> {
        Some(Self {
            pre_edges_out: dissoc2(&self.pre_edges_out, node, port)?,
            ..self.clone()
        })
    }
}
