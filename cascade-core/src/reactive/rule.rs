//! Recompute Rules
//!
//! A rule turns the current values of a node's inputs into the node's next
//! value. It answers with an [`Update`]: either a new value, or `Abort` to
//! keep the previous value and stop the propagation at this node. Filters
//! and gates are ordinary rules that sometimes abort.
//!
//! # Type erasure
//!
//! All inputs of one node share a value type `I`, while the node itself
//! holds a `T`. The node stores its rule as a `Box<dyn Derive<T>>`, hiding
//! `I`; `follow` recovers it by downcasting to the concrete
//! `Derivation<I, T>`, which fails for inputs of any other type.
//!
//! # Edges and positions
//!
//! A derivation keeps two views of its inputs. The edge set holds one
//! strong handle per distinct input and is what the followed-by lists
//! mirror. The position list records every input in the order it was
//! followed, repeats included, and is what the rule sees: `a.plus(&a)`
//! gets two values through a single edge.

use std::any::{type_name, Any};
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::context::Context;
use super::signal::Signal;
use crate::error::BoxError;
use crate::graph::{GraphNode, NodeId, Step};

/// The result of a recompute rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update<T> {
    /// Take this value and notify dependents.
    Value(T),

    /// Keep the previous value; no callbacks, no notification.
    Abort,
}

impl<T> Update<T> {
    /// Whether this is a veto.
    pub fn is_abort(&self) -> bool {
        matches!(self, Update::Abort)
    }

    /// Transform the carried value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Update<U> {
        match self {
            Update::Value(value) => Update::Value(f(value)),
            Update::Abort => Update::Abort,
        }
    }
}

impl<T> From<Option<T>> for Update<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Update::Abort, Update::Value)
    }
}

/// Boxed rule as stored on a node.
type RuleFn<I, T> = dyn FnMut(&[I], &Context<'_, T>) -> Result<Update<T>, BoxError>;

/// A node's rule together with its inputs, with the input type erased.
pub(crate) trait Derive<T>: Any {
    /// Run the rule against the inputs' current values. `Ok(None)` when the
    /// node follows nothing.
    fn recompute(
        &mut self,
        id: NodeId,
        step: Step,
        current: &T,
    ) -> Result<Option<Update<T>>, BoxError>;

    /// Input ids in follow order, one per position.
    fn input_ids(&self) -> Vec<NodeId>;

    /// Distinct inputs, type-erased.
    fn input_nodes(&self) -> Vec<Rc<dyn GraphNode>>;

    /// Name of the accepted input type.
    fn input_type(&self) -> &'static str;

    /// Remove `dependent` from every input's dependent list.
    fn detach(&mut self, dependent: NodeId);

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The concrete rule of a node following inputs of type `I`.
pub(crate) struct Derivation<I: 'static, T: 'static> {
    follows: IndexMap<NodeId, Signal<I>>,
    positions: Vec<NodeId>,
    max_inputs: Option<usize>,
    rule: Box<RuleFn<I, T>>,
}

impl<I, T> Derivation<I, T>
where
    I: Clone + 'static,
    T: 'static,
{
    pub fn new<F>(rule: F) -> Self
    where
        F: FnMut(&[I], &Context<'_, T>) -> Result<Update<T>, BoxError> + 'static,
    {
        Self {
            follows: IndexMap::new(),
            positions: Vec::new(),
            max_inputs: None,
            rule: Box::new(rule),
        }
    }

    /// Add an input position. Returns true if it is also a new edge.
    pub fn follow(&mut self, input: &Signal<I>) -> bool {
        self.positions.push(input.id());
        if self.follows.contains_key(&input.id()) {
            return false;
        }
        self.follows.insert(input.id(), input.clone());
        true
    }

    /// Remove every position of an input along with its edge, keeping the
    /// order of the rest.
    pub fn unfollow(&mut self, id: NodeId) -> Option<Signal<I>> {
        let handle = self.follows.shift_remove(&id)?;
        self.positions.retain(|position| *position != id);
        Some(handle)
    }

    /// Number of input positions.
    pub fn input_count(&self) -> usize {
        self.positions.len()
    }

    /// How many input positions the rule accepts, if limited.
    pub fn max_inputs(&self) -> Option<usize> {
        self.max_inputs
    }
}

impl<T> Derivation<T, T>
where
    T: Clone + 'static,
{
    /// The rule adopted by a bare node on its first `follow`: the value of
    /// its single input.
    pub fn mirror() -> Self {
        let mut derivation = Self::new(|values, _| Ok(Update::Value(values[0].clone())));
        derivation.max_inputs = Some(1);
        derivation
    }
}

impl<I, T> Derive<T> for Derivation<I, T>
where
    I: Clone + 'static,
    T: Clone + 'static,
{
    fn recompute(
        &mut self,
        id: NodeId,
        step: Step,
        current: &T,
    ) -> Result<Option<Update<T>>, BoxError> {
        if self.positions.is_empty() {
            return Ok(None);
        }

        let values: SmallVec<[I; 4]> = self
            .positions
            .iter()
            .filter_map(|id| self.follows.get(id))
            .map(Signal::value)
            .collect();
        let changed_input = step
            .via
            .and_then(|via| self.positions.iter().position(|id| *id == via));
        let ctx = Context::new(id, step.source, step.via, changed_input, current);

        (self.rule)(&values, &ctx).map(Some)
    }

    fn input_ids(&self) -> Vec<NodeId> {
        self.positions.clone()
    }

    fn input_nodes(&self) -> Vec<Rc<dyn GraphNode>> {
        self.follows
            .values()
            .map(|input| input.node().clone() as Rc<dyn GraphNode>)
            .collect()
    }

    fn input_type(&self) -> &'static str {
        type_name::<I>()
    }

    fn detach(&mut self, dependent: NodeId) {
        for input in self.follows.values() {
            input.node().remove_dependent(dependent);
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Where a node keeps its rule.
pub(crate) enum RuleSlot<T: 'static> {
    /// No rule: a plain value cell.
    Bare,

    /// A rule ready to run.
    Ready(Box<dyn Derive<T>>),

    /// The rule is running and has been moved out.
    Busy,
}
