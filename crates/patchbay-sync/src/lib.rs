// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! patchbay-sync: dual-representation synchronization for the Patchbay
//! graph editor.
//!
//! The engine keeps two representations of one document in lockstep: the
//! live, mutable [`patchbay_graph::Graph`] and an immutable, structurally
//! shared [`Snapshot`] of the same content. Every mutation goes through the
//! [`SnapshotStore`], which forwards it to the live graph and, once the
//! graph accepts it, derives the next snapshot by path-copying update.
//! Because unmodified subtrees keep their identity across snapshots, a
//! rendering layer diffs two snapshots with `Arc::ptr_eq` instead of deep
//! equality.
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

mod persist;
mod snapshot;
mod store;

/// Structurally shared ordered map used by every snapshot container.
pub use persist::Shared;
/// The immutable snapshot tree and its leaf view types.
pub use snapshot::{
    EdgeIndex, EdgeView, InitialIndex, InitialView, NodeMap, NodeView, PreEdgeIndex,
    PropertyEntry, PropertyMap, Snapshot,
};
/// The synchronization engine and its failure taxonomy.
pub use store::{SnapshotStore, StoreError};
