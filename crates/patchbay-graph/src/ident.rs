// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! Identifier types for nodes, ports, and edge endpoints.
//!
//! Identifiers are user-visible strings (the editor renames nodes in place),
//! wrapped in dedicated types so node and port names cannot be mixed up at a
//! call site. All of them order lexicographically, which is what keeps
//! `BTreeMap`-backed storage deterministic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one graph.
///
/// Edges and initial packets reference nodes by id, not by owned pointer:
/// renaming a node moves its entry but does **not** re-key the structures
/// that reference it (see [`crate::Graph::rename_node`]).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a node name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the node name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a port on a node.
///
/// Port names are scoped to their node; the same name on two nodes refers to
/// two unrelated ports.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(String);

impl PortId {
    /// Wraps a port name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the port name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PortId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One endpoint of an edge: a port on a node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PortRef {
    /// Owning node.
    pub node: NodeId,
    /// Port on that node.
    pub port: PortId,
}

impl PortRef {
    /// Builds an endpoint from a node and port name.
    pub fn new(node: impl Into<NodeId>, port: impl Into<PortId>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.port)
    }
}

/// Full identity of a directed edge: outport endpoint to inport endpoint.
///
/// Two edges between the same pair of ports are the same edge; the graph
/// stores at most one metadata value per key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct EdgeKey {
    /// Source endpoint (an outport).
    pub from: PortRef,
    /// Destination endpoint (an inport).
    pub to: PortRef,
}

impl EdgeKey {
    /// Builds an edge identity from its two endpoints.
    #[must_use]
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
