//! Graph Nodes
//!
//! This module defines node identity and the object-safe view of a node
//! that the propagation worklist operates on.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::snapshot::NodeSnapshot;
use crate::error::Result;

/// Unique identifier for a node in the signal graph.
///
/// Identifiers are never reused, so comparing two ids is the same as
/// comparing node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One visit of the propagation worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    /// The node whose change started this propagation.
    pub source: NodeId,

    /// The input the notification arrived through. `None` when the node
    /// recomputes on its own behalf (`update`, `follow`, construction).
    pub via: Option<NodeId>,
}

impl Step {
    /// A step where `node` is the root of its own propagation.
    pub fn root(node: NodeId) -> Self {
        Self {
            source: node,
            via: None,
        }
    }
}

/// What a recomputation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The node took a new value and ran its callbacks.
    Changed,

    /// The rule vetoed the new value.
    Aborted,

    /// The node follows nothing, so there was nothing to recompute.
    Idle,
}

/// A node in the signal graph, with its value type erased.
///
/// Implemented by every typed signal node; the worklist and snapshots only
/// ever see nodes through this trait.
pub(crate) trait GraphNode {
    /// The node's identity.
    fn id(&self) -> NodeId;

    /// Recompute from the current values of the inputs and, unless the rule
    /// aborts, assign the result and run the change callbacks.
    fn recompute(&self, step: Step) -> Result<Outcome>;

    /// Live dependents in registration order. Dead back-references are
    /// pruned as a side effect.
    fn dependents(&self) -> Vec<Rc<dyn GraphNode>>;

    /// Inputs in follow order.
    fn inputs(&self) -> Vec<Rc<dyn GraphNode>>;

    /// Describe this node for a [`GraphSnapshot`](super::GraphSnapshot).
    fn snapshot(&self) -> NodeSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
        assert!(id2 > id1);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::from(42).to_string(), "n42");
        assert_eq!(NodeId::from(42).raw(), 42);
    }

    #[test]
    fn root_step_has_no_via() {
        let id = NodeId::new();
        let step = Step::root(id);
        assert_eq!(step.source, id);
        assert!(step.via.is_none());
    }
}
