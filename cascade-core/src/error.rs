//! Error types for the signal engine.

use thiserror::Error;

use crate::graph::NodeId;

/// Boxed error produced by a fallible recompute rule.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = SignalError> = std::result::Result<T, E>;

/// Everything that can go wrong while building or propagating through
/// a signal graph.
#[derive(Error, Debug)]
pub enum SignalError {
    /// A user-supplied recompute rule returned an error. The node kept its
    /// previous value and the propagation stopped at this node.
    #[error("recompute of node {node} failed: {source}")]
    Recompute {
        node: NodeId,
        #[source]
        source: BoxError,
    },

    /// A node was updated or changed while its own rule was running.
    #[error("node {node} was re-entered while it was being recomputed")]
    Reentrant { node: NodeId },

    /// `follow`/`dont_follow` was given inputs of a type the node's rule
    /// does not accept.
    #[error("node {node} follows inputs of type `{expected}`, got `{found}`")]
    InputType {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },

    /// A node's rule takes fewer inputs than `follow` would give it. The
    /// default rule of a bare signal takes exactly one; several inputs need
    /// an explicit rule such as `combine` or `either`.
    #[error("node {node} accepts at most {limit} input(s), got {found}")]
    TooManyInputs {
        node: NodeId,
        limit: usize,
        found: usize,
    },

    /// A single propagation ran more recomputations than the configured
    /// budget, usually a cycle that never returns to its origin.
    #[error("propagation from node {origin} exceeded {limit} steps")]
    StepLimit { origin: NodeId, limit: usize },

    /// Propagations started from callbacks or rules nested too deeply.
    #[error("propagation nested deeper than {limit} levels")]
    DepthLimit { limit: usize },

    /// A follows edge without its followed-by counterpart, or vice versa.
    #[error("edge {from} -> {to} is not mirrored on both ends")]
    BrokenEdge { from: NodeId, to: NodeId },

    /// Configuration or snapshot (de)serialization failed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recompute_error_exposes_source() {
        use std::error::Error as _;

        let err = SignalError::Recompute {
            node: NodeId::from(7),
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "recompute of node n7 failed: boom");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".into()));
    }

    #[test]
    fn limit_messages_name_the_budget() {
        let err = SignalError::TooManyInputs {
            node: NodeId::from(2),
            limit: 1,
            found: 3,
        };
        assert_eq!(err.to_string(), "node n2 accepts at most 1 input(s), got 3");

        let err = SignalError::StepLimit {
            origin: NodeId::from(3),
            limit: 10,
        };
        assert_eq!(err.to_string(), "propagation from node n3 exceeded 10 steps");
        assert_eq!(
            SignalError::DepthLimit { limit: 4 }.to_string(),
            "propagation nested deeper than 4 levels"
        );
    }
}
