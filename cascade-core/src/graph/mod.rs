//! Dependency Graph
//!
//! This module holds the type-erased side of the signal graph: node
//! identity, the propagation worklist, and snapshots for introspection.
//!
//! # Overview
//!
//! The graph is a directed graph that may contain cycles, where:
//!
//! - Nodes are signals, each holding a value of its own type
//! - Edges are follow relations: if B follows A, B recomputes when A changes
//!
//! Every edge is stored on both ends. The following node owns a strong
//! handle to each of its inputs; the input keeps only a weak back-reference
//! to its dependent, so dependents never keep their inputs' followers alive.
//!
//! # Propagation
//!
//! When a node changes, its dependents are recomputed depth-first in
//! registration order. The traversal carries the identity of the node that
//! started it, and stops fanning out when it reaches that node again; this
//! is what lets mutually-following signals exist without recursing forever.
//! The traversal is an explicit stack rather than call recursion, so deep
//! follower chains do not grow the call stack.

mod node;
mod propagation;
mod snapshot;

pub use node::NodeId;
pub use snapshot::{GraphSnapshot, NodeSnapshot};

pub(crate) use node::{GraphNode, Outcome, Step};
pub(crate) use propagation::Propagation;
