// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! The synchronization engine: one live graph, one immutable snapshot,
//! kept in lockstep.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use patchbay_graph::{Graph, GraphError, Metadata, NodeId, PortRef, Value};

use crate::snapshot::Snapshot;

/// Error returned by [`SnapshotStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The live graph rejected the forwarded mutation; the snapshot was left
    /// untouched.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The operation is a declared placeholder with no implementation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// A pre-edge was described with neither endpoint fixed.
    #[error("pre-edge requires at least one fixed endpoint")]
    PreEdgeEndpointMissing,
}

/// Owns the live [`Graph`] and the current [`Snapshot`] as one consistent
/// unit.
///
/// Every mutating operation forwards to the live graph first and derives the
/// next snapshot only after that call succeeds, so after any operation
/// returns, both representations describe the same logical graph content.
/// The snapshot is replaced wholesale (a single `Arc` field assignment);
/// readers holding an earlier [`SnapshotStore::snapshot`] value always see a
/// complete, unchanging tree.
///
/// The store is single-owner and synchronous: no operation suspends, nothing
/// is retried internally, and no two operations may run concurrently against
/// the same instance. A multi-threaded host must wrap each public operation
/// in its own critical section.
#[derive(Debug)]
pub struct SnapshotStore {
    graph: Graph,
    snapshot: Arc<Snapshot>,
}

impl SnapshotStore {
    /// Builds a store over `graph`, bulk-loading the snapshot from the
    /// graph's current content.
    ///
    /// The load replays the same per-mutation update code the live API uses:
    /// nodes first (edge endpoints must already exist conceptually), then
    /// edges, then initial packets, then properties.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        let mut snapshot = Snapshot::new();
        for (id, node) in graph.iter_nodes() {
            snapshot = snapshot.with_node(id, &node.component, &node.metadata);
        }
        for (key, metadata) in graph.iter_edges() {
            snapshot = snapshot.with_edge(&key.from, &key.to, metadata);
        }
        for (to, initial) in graph.iter_initials() {
            snapshot = snapshot.with_initial(&to.node, &to.port, &initial.data, &initial.metadata);
        }
        for (name, value) in graph.properties() {
            snapshot = snapshot.with_property(name, value);
        }
        debug!(
            nodes = graph.iter_nodes().count(),
            edges = graph.iter_edges().count(),
            "bulk-loaded snapshot from live graph"
        );
        Self {
            graph,
            snapshot: Arc::new(snapshot),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The returned value is safe to retain across further store operations;
    /// it never changes. Compare retained snapshots against newer ones with
    /// the `Snapshot::same_*` helpers or `Arc::ptr_eq` on any subtree.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Read access to the live graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    // ── forwarded mutations (graph first, snapshot second) ──────────

    /// Adds a node instantiating `component`.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn add_node(
        &mut self,
        id: NodeId,
        component: impl Into<String>,
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        let component = component.into();
        self.graph
            .add_node(id.clone(), component.clone(), metadata.clone())?;
        self.replace(self.snapshot.with_node(&id, &component, &metadata));
        debug!(node = %id, %component, "added node");
        Ok(())
    }

    /// Removes a node.
    ///
    /// Edges and initials referencing the node are separate removals; see
    /// [`Graph::remove_node`].
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), StoreError> {
        self.graph.remove_node(id)?;
        self.replace_if(self.snapshot.without_node(id));
        debug!(node = %id, "removed node");
        Ok(())
    }

    /// Renames a node, moving its entry to the new id.
    ///
    /// Edge and initializer keys referencing the old id are **not**
    /// rewritten, in either representation; rename a node only while it has
    /// no attached edges or initials, or re-key them explicitly afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn rename_node(&mut self, old: &NodeId, new: NodeId) -> Result<(), StoreError> {
        self.graph.rename_node(old, new.clone())?;
        self.replace_if(self.snapshot.with_node_renamed(old, &new));
        debug!(from = %old, to = %new, "renamed node");
        Ok(())
    }

    /// Replaces a node's metadata.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn set_node_metadata(&mut self, id: &NodeId, metadata: Metadata) -> Result<(), StoreError> {
        self.graph.set_node_metadata(id, metadata.clone())?;
        self.replace_if(self.snapshot.with_node_metadata(id, &metadata));
        Ok(())
    }

    /// Connects `from` to `to`, recording the edge in both mirror indexes
    /// with an identical (shared) leaf.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn add_edge(
        &mut self,
        from: PortRef,
        to: PortRef,
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        self.graph
            .add_edge(from.clone(), to.clone(), metadata.clone())?;
        self.replace(self.snapshot.with_edge(&from, &to, &metadata));
        debug!(%from, %to, "added edge");
        Ok(())
    }

    /// Disconnects `from` from `to`, removing the edge from both mirrors and
    /// pruning any container the removal empties.
    ///
    /// Removing an edge that does not exist is a successful no-op and leaves
    /// the snapshot reference unchanged.
    pub fn remove_edge(&mut self, from: &PortRef, to: &PortRef) {
        self.graph.remove_edge(from, to);
        self.replace_if(self.snapshot.without_edge(from, to));
        debug!(%from, %to, "removed edge");
    }

    /// Replaces an edge's metadata in both mirrors.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn set_edge_metadata(
        &mut self,
        from: &PortRef,
        to: &PortRef,
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        self.graph.set_edge_metadata(from, to, metadata.clone())?;
        self.replace_if(self.snapshot.with_edge_metadata(from, to, &metadata));
        Ok(())
    }

    /// Feeds constant `data` into `to` as an initial packet.
    ///
    /// # Errors
    ///
    /// Propagates the live graph's rejection; the snapshot is untouched.
    pub fn add_initial(
        &mut self,
        data: Value,
        to: PortRef,
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        self.graph
            .add_initial(data.clone(), to.clone(), metadata.clone())?;
        self.replace(self.snapshot.with_initial(&to.node, &to.port, &data, &metadata));
        debug!(%to, "added initial packet");
        Ok(())
    }

    /// Removes the initial packet feeding `to`, pruning the node's packet
    /// container when it empties.
    ///
    /// Removing a packet that does not exist is a successful no-op.
    pub fn remove_initial(&mut self, to: &PortRef) {
        self.graph.remove_initial(to);
        self.replace_if(self.snapshot.without_initial(&to.node, &to.port));
        debug!(%to, "removed initial packet");
    }

    /// Merges graph-level properties, replacing each named entry
    /// independently.
    pub fn set_properties(&mut self, props: BTreeMap<String, Value>) {
        self.graph.set_properties(props.clone());
        let mut snapshot = (*self.snapshot).clone();
        for (name, value) in &props {
            snapshot = snapshot.with_property(name, value);
        }
        self.replace(snapshot);
    }

    // ── snapshot-only operations (transient UI state) ───────────────

    /// Marks node `id` as selected. Unknown ids are a no-op.
    pub fn select_node(&mut self, id: &NodeId) {
        self.replace_if(self.snapshot.with_node_selected(id, true));
    }

    /// Clears node `id` from the selection. Unknown ids are a no-op.
    pub fn unselect_node(&mut self, id: &NodeId) {
        self.replace_if(self.snapshot.with_node_selected(id, false));
    }

    /// Marks the edge from `from` to `to` as selected. Unknown edges are a
    /// no-op.
    pub fn select_edge(&mut self, from: &PortRef, to: &PortRef) {
        self.replace_if(self.snapshot.with_edge_selected(from, to, true));
    }

    /// Clears the edge from `from` to `to` from the selection. Unknown edges
    /// are a no-op.
    pub fn unselect_edge(&mut self, from: &PortRef, to: &PortRef) {
        self.replace_if(self.snapshot.with_edge_selected(from, to, false));
    }

    /// Records the in-progress edge being dragged by the user.
    ///
    /// The pre-edge is indexed by whichever endpoint is already fixed: under
    /// the inbound index when `to` is known, otherwise under the outbound
    /// index. Pre-edges never touch the live graph.
    ///
    /// # Errors
    ///
    /// [`StoreError::PreEdgeEndpointMissing`] when neither endpoint is given.
    pub fn add_pre_edge(
        &mut self,
        from: Option<&PortRef>,
        to: Option<&PortRef>,
        metadata: Metadata,
    ) -> Result<(), StoreError> {
        if let Some(to) = to {
            self.replace(self.snapshot.with_pre_edge_in(&to.node, &to.port, &metadata));
            return Ok(());
        }
        let from = from.ok_or(StoreError::PreEdgeEndpointMissing)?;
        self.replace(
            self.snapshot
                .with_pre_edge_out(&from.node, &from.port, &metadata),
        );
        Ok(())
    }

    /// Clears the pending pre-edge for the given endpoints, preferring the
    /// inbound index when both hold an entry. Absent entries are a no-op.
    pub fn remove_pre_edge(&mut self, from: Option<&PortRef>, to: Option<&PortRef>) {
        if let Some(to) = to {
            if self.snapshot.pre_edge_in(&to.node, &to.port).is_some() {
                self.replace_if(self.snapshot.without_pre_edge_in(&to.node, &to.port));
                return;
            }
        }
        if let Some(from) = from {
            self.replace_if(self.snapshot.without_pre_edge_out(&from.node, &from.port));
        }
    }

    // ── declared placeholders ───────────────────────────────────────

    /// Indexed (array-port) edge variant. Not implemented.
    ///
    /// # Errors
    ///
    /// Always [`StoreError::Unsupported`]; neither representation is
    /// touched.
    pub fn add_edge_index(
        &mut self,
        _from: PortRef,
        _from_index: Option<usize>,
        _to: PortRef,
        _to_index: Option<usize>,
        _metadata: Metadata,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("add_edge_index"))
    }

    /// Indexed (array-port) initial-packet variant. Not implemented.
    ///
    /// # Errors
    ///
    /// Always [`StoreError::Unsupported`]; neither representation is
    /// touched.
    pub fn add_initial_index(
        &mut self,
        _data: Value,
        _to: PortRef,
        _index: Option<usize>,
        _metadata: Metadata,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("add_initial_index"))
    }

    fn replace(&mut self, next: Snapshot) {
        self.snapshot = Arc::new(next);
    }

    fn replace_if(&mut self, next: Option<Snapshot>) {
        if let Some(next) = next {
            self.snapshot = Arc::new(next);
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Graph::new())
    }
}
