//! Propagation Worklist
//!
//! A propagation starts when a node changes and visits its dependents
//! depth-first, in registration order.
//!
//! # Algorithm
//!
//! 1. Push the changed node's dependents onto a stack, last one first, each
//!    tagged with the node it was notified through
//! 2. Pop a node and recompute it
//! 3. If it changed and it is not the node that started the propagation,
//!    push its own dependents the same way
//! 4. Repeat until the stack is empty
//!
//! Because children are pushed on top of their pending siblings, the visit
//! order matches a recursive depth-first traversal exactly. Reaching the
//! starting node again ends that branch: the node takes the recomputed value
//! but does not notify anyone, which is what stops follow cycles.
//!
//! Recomputations through two paths to the same node are not merged; each
//! path recomputes it separately.

use std::rc::Rc;

use super::node::{GraphNode, NodeId, Outcome, Step};
use crate::error::{Result, SignalError};

/// A single in-flight propagation.
pub(crate) struct Propagation {
    /// The node whose change started this propagation.
    source: NodeId,

    /// Pending visits: the node and the input it is notified through.
    stack: Vec<(Rc<dyn GraphNode>, NodeId)>,

    /// Recomputations performed so far.
    steps: usize,

    /// Recomputation budget.
    max_steps: usize,
}

impl Propagation {
    /// Start a propagation rooted at `source`.
    pub fn new(source: NodeId, max_steps: usize) -> Self {
        Self {
            source,
            stack: Vec::new(),
            steps: 0,
            max_steps,
        }
    }

    /// Queue every dependent of `node`, keeping registration order.
    pub fn schedule_dependents(&mut self, node: &dyn GraphNode) {
        let via = node.id();
        for dependent in node.dependents().into_iter().rev() {
            self.stack.push((dependent, via));
        }
    }

    /// Drain the worklist. Returns the number of recomputations performed.
    ///
    /// The first error aborts the whole propagation; nodes not yet visited
    /// keep their values.
    pub fn run(mut self) -> Result<usize> {
        tracing::debug!(source = %self.source, "propagation started");

        while let Some((node, via)) = self.stack.pop() {
            self.steps += 1;
            if self.steps > self.max_steps {
                tracing::warn!(
                    source = %self.source,
                    limit = self.max_steps,
                    "propagation step budget exhausted"
                );
                return Err(SignalError::StepLimit {
                    origin: self.source,
                    limit: self.max_steps,
                });
            }

            let step = Step {
                source: self.source,
                via: Some(via),
            };
            let outcome = node.recompute(step)?;

            // Back at the origin: take the value, notify no one.
            if outcome == Outcome::Changed && node.id() != self.source {
                self.schedule_dependents(&*node);
            }
        }

        tracing::debug!(source = %self.source, steps = self.steps, "propagation finished");
        Ok(self.steps)
    }
}
