// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! Record types stored by the live graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque JSON value carried by metadata and initial packets.
pub type Value = serde_json::Value;

/// Opaque metadata attached to nodes, edges, and initial packets.
///
/// The graph never interprets metadata; hosts use it for editor concerns such
/// as canvas position, labels, or routing hints. `BTreeMap` keeps enumeration
/// deterministic.
pub type Metadata = BTreeMap<String, Value>;

/// Materialised record for a single node.
///
/// The node's id is not embedded here; the graph supplies it externally as
/// the storage key, which is what makes rename a key move rather than a
/// record rewrite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Name of the component this node instantiates (e.g. `core/Repeat`).
    pub component: String,
    /// Opaque editor metadata.
    pub metadata: Metadata,
}

/// Initial information packet: constant data fed into an inport instead of a
/// live edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Initial {
    /// The packet payload.
    pub data: Value,
    /// Opaque editor metadata.
    pub metadata: Metadata,
}
