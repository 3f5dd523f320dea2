// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! patchbay-graph: the live, mutable flow-graph model.
//!
//! This crate owns the editable source of truth for a Patchbay document:
//! nodes instantiating components, edges connecting ports, initial
//! information packets (IIPs) feeding constant data into ports, and
//! graph-level properties. Mutations validate their inputs and reject with
//! typed errors; enumeration is deterministic (`BTreeMap` order) so that
//! derived representations can be rebuilt reproducibly.
//!
//! The synchronization layer in `patchbay-sync` forwards every mutation here
//! first and derives its immutable snapshot only after the call succeeds.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod graph;
mod ident;
mod record;

/// Validated mutable flow-graph and its rejection taxonomy.
pub use graph::{Graph, GraphError};
/// Identifier types for nodes, ports, and edge endpoints.
pub use ident::{EdgeKey, NodeId, PortId, PortRef};
/// Record types stored by the graph, plus the opaque metadata alias.
pub use record::{Initial, Metadata, Node, Value};
