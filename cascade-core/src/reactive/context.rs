//! Recompute Context
//!
//! A rule receives the current values of its inputs plus a [`Context`]
//! describing the node being recomputed and the propagation that reached it.
//! The context only lives for the duration of one rule call.
//!
//! # Source and via
//!
//! - `source` is the node whose change started the propagation. It is the
//!   node itself when the recomputation was requested directly (`update`,
//!   `follow`, construction).
//! - `via` is the input the notification arrived through, and
//!   `changed_input` its position among the inputs. Rules that follow many
//!   signals use it to tell which one moved.

use crate::graph::NodeId;

/// What a rule can see about the node it is recomputing.
#[derive(Debug)]
pub struct Context<'a, T> {
    id: NodeId,
    source: NodeId,
    via: Option<NodeId>,
    changed_input: Option<usize>,
    value: &'a T,
}

impl<'a, T> Context<'a, T> {
    pub(crate) fn new(
        id: NodeId,
        source: NodeId,
        via: Option<NodeId>,
        changed_input: Option<usize>,
        value: &'a T,
    ) -> Self {
        Self {
            id,
            source,
            via,
            changed_input,
            value,
        }
    }

    /// The node being recomputed.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's value before this recomputation.
    pub fn value(&self) -> &'a T {
        self.value
    }

    /// The node whose change started the current propagation.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Whether this node is itself the root of the current propagation.
    pub fn is_root(&self) -> bool {
        self.source == self.id
    }

    /// The input the notification arrived through.
    pub fn via(&self) -> Option<NodeId> {
        self.via
    }

    /// Position of [`via`](Self::via) among the node's inputs.
    pub fn changed_input(&self) -> Option<usize> {
        self.changed_input
    }
}
