//! Graph Snapshots
//!
//! A snapshot is a plain-data copy of the topology around a node: every
//! node reachable through inputs or dependents, with its edges. It is meant
//! for debugging and tests; nothing in the engine reads it back.

use std::collections::VecDeque;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::node::{GraphNode, NodeId};
use crate::error::{Result, SignalError};

/// One node as seen at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// The node's identity.
    pub id: NodeId,

    /// Rust type name of the node's value.
    pub value_type: String,

    /// Inputs, in follow order, one per position.
    pub follows: Vec<NodeId>,

    /// Live dependents, in registration order.
    pub followed_by: Vec<NodeId>,

    /// Number of registered change callbacks.
    pub subscribers: usize,

    /// Whether the node carries a recompute rule.
    pub derived: bool,
}

/// The connected component around one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Captured nodes, sorted by id.
    pub nodes: Vec<NodeSnapshot>,
}

impl GraphSnapshot {
    /// Walk inputs and dependents breadth-first from `start`.
    pub(crate) fn capture(start: Rc<dyn GraphNode>) -> Self {
        let mut seen: IndexMap<NodeId, NodeSnapshot> = IndexMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            let id = node.id();
            if seen.contains_key(&id) {
                continue;
            }
            seen.insert(id, node.snapshot());

            for next in node.inputs().into_iter().chain(node.dependents()) {
                if !seen.contains_key(&next.id()) {
                    queue.push_back(next);
                }
            }
        }

        let mut nodes: Vec<_> = seen.into_values().collect();
        nodes.sort_by_key(|n| n.id);
        Self { nodes }
    }

    /// Look up a captured node.
    pub fn node(&self, id: NodeId) -> Option<&NodeSnapshot> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|index| &self.nodes[index])
    }

    /// Number of follow edges in the snapshot. An input followed at
    /// several positions is one edge.
    pub fn edge_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.follows.iter().collect::<IndexSet<_>>().len())
            .sum()
    }

    /// Check that every edge is recorded on both of its ends.
    ///
    /// Edges leading outside the snapshot are ignored.
    pub fn verify(&self) -> Result<()> {
        for node in &self.nodes {
            for &input in &node.follows {
                if let Some(other) = self.node(input) {
                    if !other.followed_by.contains(&node.id) {
                        return Err(SignalError::BrokenEdge {
                            from: node.id,
                            to: input,
                        });
                    }
                }
            }
            for &dependent in &node.followed_by {
                if let Some(other) = self.node(dependent) {
                    if !other.follows.contains(&node.id) {
                        return Err(SignalError::BrokenEdge {
                            from: dependent,
                            to: node.id,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, follows: &[u64], followed_by: &[u64]) -> NodeSnapshot {
        NodeSnapshot {
            id: NodeId::from(id),
            value_type: "i32".into(),
            follows: follows.iter().copied().map(NodeId::from).collect(),
            followed_by: followed_by.iter().copied().map(NodeId::from).collect(),
            subscribers: 0,
            derived: !follows.is_empty(),
        }
    }

    #[test]
    fn verify_accepts_mirrored_edges() {
        let snapshot = GraphSnapshot {
            nodes: vec![node(1, &[], &[2]), node(2, &[1], &[])],
        };
        assert!(snapshot.verify().is_ok());
        assert_eq!(snapshot.edge_count(), 1);
    }

    #[test]
    fn repeated_positions_count_as_one_edge() {
        let snapshot = GraphSnapshot {
            nodes: vec![node(1, &[], &[2]), node(2, &[1, 1], &[])],
        };
        assert!(snapshot.verify().is_ok());
        assert_eq!(snapshot.edge_count(), 1);
    }

    #[test]
    fn verify_rejects_one_sided_edges() {
        let snapshot = GraphSnapshot {
            nodes: vec![node(1, &[], &[]), node(2, &[1], &[])],
        };
        let err = snapshot.verify().unwrap_err();
        assert!(matches!(
            err,
            SignalError::BrokenEdge { from, to } if from == NodeId::from(2) && to == NodeId::from(1)
        ));
    }

    #[test]
    fn lookup_and_json() {
        let snapshot = GraphSnapshot {
            nodes: vec![node(1, &[], &[2]), node(2, &[1], &[])],
        };
        assert_eq!(snapshot.node(NodeId::from(2)).unwrap().follows, vec![NodeId::from(1)]);
        assert!(snapshot.node(NodeId::from(3)).is_none());

        let json = snapshot.to_json().unwrap();
        let parsed: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
