// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! The mutable flow-graph store and its rejection taxonomy.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ident::{EdgeKey, NodeId, PortRef};
use crate::record::{Initial, Metadata, Node, Value};

/// Error returned by [`Graph`] mutations.
///
/// Rejections happen before any state is touched: a failed mutation leaves
/// the graph exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The referenced node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// A node with this id already exists.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),
    /// The referenced edge does not exist.
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeKey),
}

/// In-memory flow-graph model.
///
/// All storage is `BTreeMap`-backed so enumeration order is deterministic,
/// which lets derived representations (the `patchbay-sync` snapshot) be
/// rebuilt reproducibly from a bulk load.
///
/// Invariants
/// - Node ids are unique within `nodes`.
/// - Edges and initial packets reference nodes by id. [`Graph::remove_node`]
///   and [`Graph::rename_node`] do not cascade, so edges and initials may
///   dangle until the host removes or re-keys them with separate calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeKey, Metadata>,
    initials: BTreeMap<PortRef, Initial>,
    properties: BTreeMap<String, Value>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node instantiating `component`.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateNode`] if a node with `id` already exists.
    pub fn add_node(
        &mut self,
        id: NodeId,
        component: impl Into<String>,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(
            id,
            Node {
                component: component.into(),
                metadata,
            },
        );
        Ok(())
    }

    /// Removes a node entry.
    ///
    /// Edges and initials referencing the node are left in place (they arrive
    /// as separate removal calls from the editor, in either order).
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if `id` does not exist.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), GraphError> {
        self.nodes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))
    }

    /// Moves the node stored under `old` to the key `new`.
    ///
    /// Edge and initial keys referencing `old` are **not** rewritten; callers
    /// must rename a node while it has no attached edges or initials, or
    /// re-key those structures themselves afterwards.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if `old` does not exist;
    /// [`GraphError::DuplicateNode`] if `new` is already taken.
    pub fn rename_node(&mut self, old: &NodeId, new: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&new) {
            return Err(GraphError::DuplicateNode(new));
        }
        let node = self
            .nodes
            .remove(old)
            .ok_or_else(|| GraphError::NodeNotFound(old.clone()))?;
        self.nodes.insert(new, node);
        Ok(())
    }

    /// Replaces the metadata of an existing node.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if `id` does not exist.
    pub fn set_node_metadata(&mut self, id: &NodeId, metadata: Metadata) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        node.metadata = metadata;
        Ok(())
    }

    /// Inserts or replaces the edge from `from` to `to`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if either endpoint node does not exist.
    pub fn add_edge(
        &mut self,
        from: PortRef,
        to: PortRef,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        for endpoint in [&from, &to] {
            if !self.nodes.contains_key(&endpoint.node) {
                return Err(GraphError::NodeNotFound(endpoint.node.clone()));
            }
        }
        self.edges.insert(EdgeKey::new(from, to), metadata);
        Ok(())
    }

    /// Removes the edge from `from` to `to`.
    ///
    /// Removal is idempotent: returns `true` if an edge was removed, `false`
    /// if no such edge existed.
    pub fn remove_edge(&mut self, from: &PortRef, to: &PortRef) -> bool {
        self.edges
            .remove(&EdgeKey::new(from.clone(), to.clone()))
            .is_some()
    }

    /// Replaces the metadata of an existing edge.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] if no edge connects `from` to `to`.
    pub fn set_edge_metadata(
        &mut self,
        from: &PortRef,
        to: &PortRef,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        let key = EdgeKey::new(from.clone(), to.clone());
        let slot = self
            .edges
            .get_mut(&key)
            .ok_or(GraphError::EdgeNotFound(key))?;
        *slot = metadata;
        Ok(())
    }

    /// Inserts or replaces the initial packet feeding `to`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if the target node does not exist.
    pub fn add_initial(
        &mut self,
        data: Value,
        to: PortRef,
        metadata: Metadata,
    ) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&to.node) {
            return Err(GraphError::NodeNotFound(to.node));
        }
        self.initials.insert(to, Initial { data, metadata });
        Ok(())
    }

    /// Removes the initial packet feeding `to`.
    ///
    /// Removal is idempotent: returns `true` if a packet was removed.
    pub fn remove_initial(&mut self, to: &PortRef) -> bool {
        self.initials.remove(to).is_some()
    }

    /// Merges graph-level properties, replacing each named entry
    /// independently. Entries not named in `props` are left untouched.
    pub fn set_properties(&mut self, props: BTreeMap<String, Value>) {
        self.properties.extend(props);
    }

    /// Returns the node stored under `id`, if any.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns `true` if a node with `id` exists.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the metadata of the edge from `from` to `to`, if any.
    #[must_use]
    pub fn edge_metadata(&self, from: &PortRef, to: &PortRef) -> Option<&Metadata> {
        self.edges.get(&EdgeKey::new(from.clone(), to.clone()))
    }

    /// Returns the initial packet feeding `to`, if any.
    #[must_use]
    pub fn initial(&self, to: &PortRef) -> Option<&Initial> {
        self.initials.get(to)
    }

    /// Returns the graph-level properties.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Iterates all nodes (id, record) in deterministic order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Iterates all edges (key, metadata) in deterministic order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (&EdgeKey, &Metadata)> {
        self.edges.iter()
    }

    /// Iterates all initial packets (target, record) in deterministic order.
    pub fn iter_initials(&self) -> impl Iterator<Item = (&PortRef, &Initial)> {
        self.initials.iter()
    }
}
