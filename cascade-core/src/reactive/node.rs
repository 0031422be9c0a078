//! Signal Nodes
//!
//! The shared state behind a [`Signal`](super::Signal) handle: the value,
//! the rule with its inputs, the weak list of dependents and the change
//! subscribers.
//!
//! No `RefCell` borrow is held while user code runs. Rules run with the rule
//! moved out of its slot (the slot reads `Busy`), and callbacks run on a
//! copy of the subscriber list, so a rule or callback touching its own node
//! gets a [`SignalError::Reentrant`] rather than a borrow panic.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::rule::{Derive, RuleSlot, Update};
use super::runtime::Runtime;
use super::subscriber::{Subscriber, SubscriberId};
use crate::error::{Result, SignalError};
use crate::graph::{GraphNode, NodeId, NodeSnapshot, Outcome, Step};

pub(crate) struct SignalNode<T: 'static> {
    id: NodeId,
    value: RefCell<T>,
    rule: RefCell<RuleSlot<T>>,
    followed_by: RefCell<IndexMap<NodeId, Weak<dyn GraphNode>>>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
}

impl<T: Clone + 'static> SignalNode<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: NodeId::new(),
            value: RefCell::new(value),
            rule: RefCell::new(RuleSlot::Bare),
            followed_by: RefCell::new(IndexMap::new()),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    pub fn rule(&self) -> &RefCell<RuleSlot<T>> {
        &self.rule
    }

    /// Store a new value and run the change callbacks in registration order.
    pub fn assign(&self, value: T) -> Result<()> {
        {
            let mut slot = self
                .value
                .try_borrow_mut()
                .map_err(|_| SignalError::Reentrant { node: self.id })?;
            *slot = value.clone();
        }
        tracing::trace!(node = %self.id, "value assigned");

        let callbacks: Vec<_> = self
            .subscribers
            .borrow()
            .iter()
            .map(Subscriber::callback)
            .collect();
        for callback in callbacks {
            callback(&value);
        }
        Ok(())
    }

    pub fn subscribe(&self, subscriber: Subscriber<T>) -> SubscriberId {
        let id = subscriber.id();
        self.subscribers.borrow_mut().push(subscriber);
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|s| s.id() != id);
        subscribers.len() != before
    }

    pub fn add_dependent(&self, id: NodeId, dependent: Weak<dyn GraphNode>) {
        self.followed_by.borrow_mut().insert(id, dependent);
    }

    pub fn remove_dependent(&self, id: NodeId) {
        match self.followed_by.try_borrow_mut() {
            Ok(mut followed_by) => {
                followed_by.shift_remove(&id);
            }
            Err(_) => tracing::warn!(
                node = %self.id,
                dependent = %id,
                "dependent list busy, edge left in place"
            ),
        }
    }

    /// Ids of the live dependents, in registration order.
    pub fn dependent_ids(&self) -> Vec<NodeId> {
        self.followed_by
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn input_ids(&self) -> Vec<NodeId> {
        match &*self.rule.borrow() {
            RuleSlot::Ready(derive) => derive.input_ids(),
            RuleSlot::Bare | RuleSlot::Busy => Vec::new(),
        }
    }
}

impl<T: Clone + 'static> GraphNode for SignalNode<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn recompute(&self, step: Step) -> Result<Outcome> {
        let Some(mut rule) = RuleGuard::take(&self.rule, self.id)? else {
            return Ok(Outcome::Idle);
        };
        tracing::trace!(node = %self.id, source = %step.source, "recomputing");

        let update = {
            let current = self
                .value
                .try_borrow()
                .map_err(|_| SignalError::Reentrant { node: self.id })?;
            rule.derive()?.recompute(self.id, step, &current)
        };
        // Put the rule back before callbacks can observe the node.
        drop(rule);

        match update {
            Ok(None) => Ok(Outcome::Idle),
            Ok(Some(Update::Value(value))) => {
                self.assign(value)?;
                Ok(Outcome::Changed)
            }
            Ok(Some(Update::Abort)) => {
                tracing::trace!(node = %self.id, "update aborted");
                Ok(Outcome::Aborted)
            }
            Err(source) => Err(SignalError::Recompute {
                node: self.id,
                source,
            }),
        }
    }

    fn dependents(&self) -> Vec<Rc<dyn GraphNode>> {
        let mut followed_by = self.followed_by.borrow_mut();
        followed_by.retain(|_, weak| weak.strong_count() > 0);
        followed_by.values().filter_map(Weak::upgrade).collect()
    }

    fn inputs(&self) -> Vec<Rc<dyn GraphNode>> {
        match &*self.rule.borrow() {
            RuleSlot::Ready(derive) => derive.input_nodes(),
            RuleSlot::Bare | RuleSlot::Busy => Vec::new(),
        }
    }

    fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            value_type: type_name::<T>().to_string(),
            follows: self.input_ids(),
            followed_by: self.dependent_ids(),
            subscribers: self.subscribers.borrow().len(),
            derived: !matches!(*self.rule.borrow(), RuleSlot::Bare),
        }
    }
}

impl<T: 'static> Drop for SignalNode<T> {
    fn drop(&mut self) {
        let slot = std::mem::replace(self.rule.get_mut(), RuleSlot::Bare);
        if let RuleSlot::Ready(mut derive) = slot {
            derive.detach(self.id);
            // The rule owns the inputs; dropping it here would recurse once
            // per link of a follower chain.
            Runtime::release(Box::new(derive));
        }
    }
}

/// A rule moved out of its slot for the duration of one call. Dropping the
/// guard puts it back, also when the rule panics.
struct RuleGuard<'a, T: 'static> {
    node: NodeId,
    slot: &'a RefCell<RuleSlot<T>>,
    derive: Option<Box<dyn Derive<T>>>,
}

impl<'a, T: 'static> RuleGuard<'a, T> {
    /// Take the rule out. `None` for a bare node.
    fn take(slot: &'a RefCell<RuleSlot<T>>, node: NodeId) -> Result<Option<Self>> {
        let mut borrowed = slot
            .try_borrow_mut()
            .map_err(|_| SignalError::Reentrant { node })?;

        match std::mem::replace(&mut *borrowed, RuleSlot::Busy) {
            RuleSlot::Ready(derive) => Ok(Some(Self {
                node,
                slot,
                derive: Some(derive),
            })),
            RuleSlot::Bare => {
                *borrowed = RuleSlot::Bare;
                Ok(None)
            }
            RuleSlot::Busy => Err(SignalError::Reentrant { node }),
        }
    }

    fn derive(&mut self) -> Result<&mut (dyn Derive<T> + 'static)> {
        let node = self.node;
        self.derive
            .as_deref_mut()
            .ok_or(SignalError::Reentrant { node })
    }
}

impl<T: 'static> Drop for RuleGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(derive) = self.derive.take() {
            match self.slot.try_borrow_mut() {
                Ok(mut slot) => *slot = RuleSlot::Ready(derive),
                Err(_) => tracing::warn!(node = %self.node, "rule slot busy, rule dropped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::rule::Derivation;
    use std::cell::Cell;

    #[test]
    fn assign_runs_callbacks_in_order() {
        let node = SignalNode::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        node.subscribe(Subscriber::new(move |v: &i32| first.borrow_mut().push(("first", *v))));
        let second = log.clone();
        node.subscribe(Subscriber::new(move |v: &i32| second.borrow_mut().push(("second", *v))));

        node.assign(3).unwrap();

        assert_eq!(node.value(), 3);
        assert_eq!(*log.borrow(), vec![("first", 3), ("second", 3)]);
    }

    #[test]
    fn unsubscribe_stops_callbacks() {
        let node = SignalNode::new(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let id = node.subscribe(Subscriber::new(move |_: &i32| {
            calls_clone.set(calls_clone.get() + 1)
        }));
        node.assign(1).unwrap();
        assert!(node.unsubscribe(id));
        assert!(!node.unsubscribe(id));
        node.assign(2).unwrap();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn bare_node_recompute_is_idle() {
        let node = SignalNode::new("x");
        let outcome = node.recompute(Step::root(node.id)).unwrap();
        assert_eq!(outcome, Outcome::Idle);
        assert_eq!(node.value(), "x");
    }

    #[test]
    fn busy_rule_is_reported_as_reentrant() {
        let node: SignalNode<i32> = SignalNode::new(0);
        *node.rule.borrow_mut() = RuleSlot::Busy;

        let err = node.recompute(Step::root(node.id)).unwrap_err();
        assert!(matches!(err, SignalError::Reentrant { node: id } if id == node.id));
    }

    fn with_mirror() -> SignalNode<i32> {
        let node = SignalNode::new(0);
        *node.rule.borrow_mut() = RuleSlot::Ready(Box::new(Derivation::<i32, i32>::mirror()));
        node
    }

    #[test]
    fn rule_guard_puts_the_rule_back() {
        let node = with_mirror();
        {
            let guard = RuleGuard::take(&node.rule, node.id).unwrap();
            assert!(guard.is_some());
            assert!(matches!(*node.rule.borrow(), RuleSlot::Busy));
        }
        assert!(matches!(*node.rule.borrow(), RuleSlot::Ready(_)));
    }

    #[test]
    fn rule_guard_tolerates_a_borrowed_slot() {
        let node = with_mirror();
        let guard = RuleGuard::take(&node.rule, node.id).unwrap();
        let held = node.rule.borrow();

        drop(guard);
        assert!(matches!(*held, RuleSlot::Busy));
    }

    #[test]
    fn remove_dependent_tolerates_a_borrowed_list() {
        let node = SignalNode::new(0);
        let dependent = Rc::new(SignalNode::new(1));
        let weak = Rc::downgrade(&dependent);
        node.add_dependent(dependent.id, weak);

        {
            let _held = node.followed_by.borrow();
            node.remove_dependent(dependent.id);
        }
        assert_eq!(node.dependent_ids(), vec![dependent.id]);

        node.remove_dependent(dependent.id);
        assert!(node.dependent_ids().is_empty());
    }
}
