//! Signal Implementation
//!
//! A Signal is the one reactive primitive. It holds a value, optionally
//! follows other signals through a recompute rule, and pushes every change
//! to the signals that follow it.
//!
//! # How Signals Work
//!
//! 1. `change(value)` stores the value, runs the `on_change` callbacks and
//!    recomputes every dependent, depth-first, before returning.
//!
//! 2. A dependent recomputes by handing its inputs' current values to its
//!    rule. The rule answers with [`Update::Value`] to change, or
//!    [`Update::Abort`] to keep the old value and stop there.
//!
//! 3. `follow`/`dont_follow` edit the inputs and recompute immediately, as
//!    if the edge had always been there.
//!
//! # Ownership
//!
//! A handle is an `Rc`. A signal owns its inputs; inputs hold their
//! dependents weakly. Dropping every handle of a derived signal detaches it
//! from its inputs. Signals that follow each other in a cycle keep each
//! other alive until one of them calls `dont_follow`.

use std::any::{type_name, TypeId};
use std::fmt::{self, Debug, Display};
use std::rc::{Rc, Weak};

use super::context::Context;
use super::node::SignalNode;
use super::rule::{Derivation, RuleSlot, Update};
use super::runtime::Runtime;
use super::subscriber::{Subscriber, SubscriberId};
use crate::error::{BoxError, Result, SignalError};
use crate::graph::{GraphNode, GraphSnapshot, NodeId, Propagation, Step};

/// A reactive signal holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use cascade_core::{Signal, Update};
///
/// let celsius = Signal::new(20.0);
/// let fahrenheit = Signal::derive(&[&celsius], |values: &[f64], _| {
///     Update::Value(values[0] * 9.0 / 5.0 + 32.0)
/// })?;
/// assert_eq!(fahrenheit.value(), 68.0);
///
/// celsius.change(100.0)?;
/// assert_eq!(fahrenheit.value(), 212.0);
/// # Ok::<(), cascade_core::SignalError>(())
/// ```
pub struct Signal<T: 'static> {
    node: Rc<SignalNode<T>>,
}

impl<T> Signal<T>
where
    T: Clone + 'static,
{
    /// Create a signal with an initial value and no inputs.
    pub fn new(value: T) -> Self {
        Self {
            node: Rc::new(SignalNode::new(value)),
        }
    }

    /// Create a signal holding `T::default()`.
    pub fn empty() -> Self
    where
        T: Default,
    {
        Self::new(T::default())
    }

    /// Create a signal that follows `inputs` with the given rule, starting
    /// from `T::default()`.
    ///
    /// The rule runs once before this returns, so the value already
    /// reflects the inputs unless the rule aborts.
    pub fn derive<I, F>(inputs: &[&Signal<I>], rule: F) -> Result<Self>
    where
        T: Default,
        I: Clone + 'static,
        F: FnMut(&[I], &Context<'_, T>) -> Update<T> + 'static,
    {
        Self::derive_from(T::default(), inputs, rule)
    }

    /// Like [`derive`](Self::derive), with an explicit initial value.
    pub fn derive_from<I, F>(initial: T, inputs: &[&Signal<I>], mut rule: F) -> Result<Self>
    where
        I: Clone + 'static,
        F: FnMut(&[I], &Context<'_, T>) -> Update<T> + 'static,
    {
        Self::with_rule(initial, inputs, move |values, ctx| Ok(rule(values, ctx)))
    }

    /// Create a signal with a fallible rule, starting from `T::default()`.
    ///
    /// An error from the rule leaves the value untouched and is returned as
    /// [`SignalError::Recompute`] from whatever operation triggered it.
    pub fn try_derive<I, F, E>(inputs: &[&Signal<I>], rule: F) -> Result<Self>
    where
        T: Default,
        I: Clone + 'static,
        F: FnMut(&[I], &Context<'_, T>) -> std::result::Result<Update<T>, E> + 'static,
        E: Into<BoxError>,
    {
        Self::try_derive_from(T::default(), inputs, rule)
    }

    /// Like [`try_derive`](Self::try_derive), with an explicit initial value.
    pub fn try_derive_from<I, F, E>(initial: T, inputs: &[&Signal<I>], mut rule: F) -> Result<Self>
    where
        I: Clone + 'static,
        F: FnMut(&[I], &Context<'_, T>) -> std::result::Result<Update<T>, E> + 'static,
        E: Into<BoxError>,
    {
        Self::with_rule(initial, inputs, move |values, ctx| {
            rule(values, ctx).map_err(Into::into)
        })
    }

    /// Create a signal following a same-typed input with the default rule:
    /// the value of that input.
    ///
    /// The default rule takes one input; more fail with
    /// [`SignalError::TooManyInputs`]. Use [`Signal::combine`] for the
    /// ordered list of several values, or
    /// [`either`](crate::ops::combine::either) for the latest one.
    pub fn follows(inputs: &[&Signal<T>]) -> Result<Self>
    where
        T: Default,
    {
        let signal = Self::empty();
        signal.follow(inputs)?;
        Ok(signal)
    }

    fn with_rule<I, F>(initial: T, inputs: &[&Signal<I>], rule: F) -> Result<Self>
    where
        I: Clone + 'static,
        F: FnMut(&[I], &Context<'_, T>) -> Result<Update<T>, BoxError> + 'static,
    {
        let signal = Self::new(initial);
        *signal.node.rule().borrow_mut() = RuleSlot::Ready(Box::new(Derivation::new(rule)));
        signal.follow(inputs)?;
        Ok(signal)
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get a clone of the current value.
    pub fn value(&self) -> T {
        self.node.value()
    }

    /// Read the current value without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.node.with_value(f)
    }

    /// Set a new value, run the callbacks and recompute every dependent.
    ///
    /// Returns once the whole propagation has finished. If a dependent's
    /// rule fails, the propagation stops there and the error is returned;
    /// this signal keeps the new value.
    pub fn change(&self, value: T) -> Result<&Self> {
        let _guard = Runtime::enter()?;
        self.node.assign(value)?;

        let mut propagation = Propagation::new(self.id(), Runtime::config().max_steps);
        propagation.schedule_dependents(&*self.node);
        propagation.run()?;
        Ok(self)
    }

    /// Recompute from the inputs' current values.
    ///
    /// The signal is the root of this recomputation, so on success its
    /// callbacks run but its dependents are not notified. A no-op for a
    /// signal that follows nothing.
    pub fn update(&self) -> Result<&Self> {
        let _guard = Runtime::enter()?;
        self.node.recompute(Step::root(self.id()))?;
        Ok(self)
    }

    /// Start following `inputs`, then recompute.
    ///
    /// Following an input again adds another position for the rule but no
    /// second edge. A bare signal (one created with [`new`](Self::new) or
    /// [`empty`](Self::empty)) adopts the default rule, which accepts a
    /// single input of its own type.
    pub fn follow<I>(&self, inputs: &[&Signal<I>]) -> Result<&Self>
    where
        I: Clone + 'static,
    {
        let _guard = Runtime::enter()?;
        self.attach(inputs)?;
        self.node.recompute(Step::root(self.id()))?;
        Ok(self)
    }

    /// Stop following `inputs`, then recompute.
    ///
    /// Inputs not currently followed are skipped.
    pub fn dont_follow<I>(&self, inputs: &[&Signal<I>]) -> Result<&Self>
    where
        I: Clone + 'static,
    {
        let _guard = Runtime::enter()?;
        let removed = self.detach(inputs)?;
        drop(removed);
        self.node.recompute(Step::root(self.id()))?;
        Ok(self)
    }

    /// Register a callback run with the new value after every change.
    ///
    /// Callbacks run in registration order, including for the changes made
    /// by `follow` and construction.
    pub fn on_change<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&T) + 'static,
    {
        self.node.subscribe(Subscriber::new(callback))
    }

    /// Remove a callback. Returns false if it was not registered here.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.node.unsubscribe(id)
    }

    /// Ids of the followed signals, in follow order, one per position.
    pub fn inputs(&self) -> Vec<NodeId> {
        self.node.input_ids()
    }

    /// Ids of the live signals following this one, in registration order.
    pub fn dependents(&self) -> Vec<NodeId> {
        self.node.dependent_ids()
    }

    /// Capture the connected component around this signal.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(self.node.clone())
    }

    pub(crate) fn node(&self) -> &Rc<SignalNode<T>> {
        &self.node
    }

    fn attach<I>(&self, inputs: &[&Signal<I>]) -> Result<()>
    where
        I: Clone + 'static,
    {
        let id = self.id();
        let mut slot = self
            .node
            .rule()
            .try_borrow_mut()
            .map_err(|_| SignalError::Reentrant { node: id })?;

        if matches!(*slot, RuleSlot::Bare) {
            if TypeId::of::<I>() != TypeId::of::<T>() {
                return Err(SignalError::InputType {
                    node: id,
                    expected: type_name::<T>(),
                    found: type_name::<I>(),
                });
            }
            check_arity(id, Some(1), inputs.len())?;
            *slot = RuleSlot::Ready(Box::new(Derivation::<T, T>::mirror()));
        }

        let RuleSlot::Ready(derive) = &mut *slot else {
            return Err(SignalError::Reentrant { node: id });
        };
        let expected = derive.input_type();
        let derivation = derive
            .as_any_mut()
            .downcast_mut::<Derivation<I, T>>()
            .ok_or(SignalError::InputType {
                node: id,
                expected,
                found: type_name::<I>(),
            })?;
        check_arity(
            id,
            derivation.max_inputs(),
            derivation.input_count() + inputs.len(),
        )?;

        let weak = Rc::downgrade(&self.node);
        let dependent: Weak<dyn GraphNode> = weak;
        for input in inputs {
            if derivation.follow(input) {
                input.node.add_dependent(id, dependent.clone());
            }
        }
        Ok(())
    }

    /// Remove `inputs` from the rule and return the handles that were
    /// dropped from it, so they are released after the slot borrow ends.
    fn detach<I>(&self, inputs: &[&Signal<I>]) -> Result<Vec<Signal<I>>>
    where
        I: Clone + 'static,
    {
        let id = self.id();
        let mut slot = self
            .node
            .rule()
            .try_borrow_mut()
            .map_err(|_| SignalError::Reentrant { node: id })?;

        let derive = match &mut *slot {
            RuleSlot::Bare => return Ok(Vec::new()),
            RuleSlot::Busy => return Err(SignalError::Reentrant { node: id }),
            RuleSlot::Ready(derive) => derive,
        };
        let expected = derive.input_type();
        let derivation = derive
            .as_any_mut()
            .downcast_mut::<Derivation<I, T>>()
            .ok_or(SignalError::InputType {
                node: id,
                expected,
                found: type_name::<I>(),
            })?;

        let mut removed = Vec::new();
        for input in inputs {
            if let Some(handle) = derivation.unfollow(input.id()) {
                input.node.remove_dependent(id);
                removed.push(handle);
            }
        }
        Ok(removed)
    }
}

fn check_arity(node: NodeId, limit: Option<usize>, found: usize) -> Result<()> {
    match limit {
        Some(limit) if found > limit => Err(SignalError::TooManyInputs { node, limit, found }),
        _ => Ok(()),
    }
}

impl<I> Signal<Vec<I>>
where
    I: Clone + 'static,
{
    /// Create a signal whose value is the ordered list of its inputs'
    /// values. An input given twice appears twice.
    pub fn combine(inputs: &[&Signal<I>]) -> Result<Self> {
        Self::derive(inputs, |values: &[I], _| Update::Value(values.to_vec()))
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: Clone + Default + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: 'static> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl<T: 'static> Eq for Signal<T> {}

impl<T> Debug for Signal<T>
where
    T: Clone + Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_value(|value| {
            f.debug_struct("Signal")
                .field("id", &self.id())
                .field("value", value)
                .field("inputs", &self.inputs().len())
                .field("dependents", &self.dependents().len())
                .finish()
        })
    }
}

impl<T> Display for Signal<T>
where
    T: Clone + Display + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_value(|value| value.fmt(f))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn signal_initial_value() {
        assert_eq!(Signal::new("test").value(), "test");
        assert_eq!(Signal::<i32>::empty().value(), 0);
        assert!(!Signal::<bool>::default().value());
    }

    #[test]
    fn signal_change() {
        let signal = Signal::new(0);
        signal.change(42).unwrap();
        assert_eq!(signal.value(), 42);
    }

    #[test]
    fn signal_follows_initial_value() {
        let a = Signal::new(7);
        let b = Signal::follows(&[&a]).unwrap();
        assert_eq!(b.value(), 7);

        a.change(8).unwrap();
        assert_eq!(b.value(), 8);
    }

    #[test]
    fn signal_combine_orders_values() {
        let a = Signal::new(1);
        let b = Signal::new(2);
        let c = Signal::combine(&[&a, &b]).unwrap();
        assert_eq!(c.value(), vec![1, 2]);

        b.change(5).unwrap();
        assert_eq!(c.value(), vec![1, 5]);
    }

    #[test]
    fn signal_edges_are_mutual() {
        let a = Signal::new(0);
        let b = Signal::follows(&[&a]).unwrap();

        assert_eq!(b.inputs(), vec![a.id()]);
        assert_eq!(a.dependents(), vec![b.id()]);

        b.dont_follow(&[&a]).unwrap();
        assert!(b.inputs().is_empty());
        assert!(a.dependents().is_empty());
    }

    #[test]
    fn repeated_input_keeps_one_edge() {
        let a = Signal::new(3);
        let c = Signal::combine(&[&a, &a]).unwrap();
        assert_eq!(c.value(), vec![3, 3]);
        assert_eq!(c.inputs(), vec![a.id(), a.id()]);
        assert_eq!(a.dependents(), vec![c.id()]);

        a.change(4).unwrap();
        assert_eq!(c.value(), vec![4, 4]);

        c.dont_follow(&[&a]).unwrap();
        assert!(c.inputs().is_empty());
        assert!(a.dependents().is_empty());
    }

    #[test]
    fn default_rule_takes_a_single_input() {
        let a = Signal::new(1);
        let b = Signal::new(2);

        let err = Signal::follows(&[&a, &b]).unwrap_err();
        assert!(matches!(
            err,
            SignalError::TooManyInputs { limit: 1, found: 2, .. }
        ));
        assert!(a.dependents().is_empty());
        assert!(b.dependents().is_empty());

        let c = Signal::follows(&[&a]).unwrap();
        let err = c.follow(&[&b]).unwrap_err();
        assert!(matches!(err, SignalError::TooManyInputs { .. }));
        assert_eq!(c.inputs(), vec![a.id()]);
        assert!(b.dependents().is_empty());

        b.change(5).unwrap();
        assert_eq!(c.value(), 1);
    }

    #[test]
    fn dont_follow_unknown_input_is_harmless() {
        let a = Signal::new(0);
        let stranger = Signal::new(1);
        let b = Signal::follows(&[&a]).unwrap();

        b.dont_follow(&[&stranger]).unwrap();
        assert_eq!(b.inputs(), vec![a.id()]);
        assert!(stranger.dependents().is_empty());
    }

    #[test]
    fn bare_signal_rejects_foreign_input_type() {
        let text = Signal::new(String::from("x"));
        let number = Signal::new(0);

        let err = number.follow(&[&text]).unwrap_err();
        assert!(matches!(err, SignalError::InputType { .. }));
        assert!(text.dependents().is_empty());
    }

    #[test]
    fn derived_signal_rejects_mismatched_input_type() {
        let a = Signal::new(1u8);
        let b = Signal::derive(&[&a], |v: &[u8], _| Update::Value(v[0] as i64)).unwrap();
        let other = Signal::new(5i64);

        let err = b.follow(&[&other]).unwrap_err();
        assert!(matches!(
            err,
            SignalError::InputType { expected, .. } if expected == type_name::<u8>()
        ));
    }

    #[test]
    fn update_does_not_notify_dependents() {
        let a = Signal::new(1);
        let b = Signal::derive(&[&a], |v: &[i32], _| Update::Value(v[0] + 1)).unwrap();
        let c = Signal::follows(&[&b]).unwrap();
        assert_eq!(c.value(), 2);

        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        b.on_change(move |_| calls_clone.set(calls_clone.get() + 1));

        b.update().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(c.value(), 2);
    }

    #[test]
    fn on_change_sees_initial_propagation() {
        let a = Signal::new(3);
        let b = Signal::<i32>::empty();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        b.on_change(move |v| seen_clone.borrow_mut().push(*v));

        b.follow(&[&a]).unwrap();
        a.change(4).unwrap();

        assert_eq!(*seen.borrow(), vec![3, 4]);
    }

    #[test]
    fn unsubscribe_removes_callback() {
        let a = Signal::new(0);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let id = a.on_change(move |_| calls_clone.set(calls_clone.get() + 1));

        a.change(1).unwrap();
        assert!(a.unsubscribe(id));
        a.change(2).unwrap();

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn context_reports_source_and_changed_input() {
        let a = Signal::new(0);
        let b = Signal::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let c = Signal::derive(&[&a, &b], move |v: &[i32], ctx| {
            seen_clone
                .borrow_mut()
                .push((ctx.source(), ctx.changed_input(), ctx.is_root()));
            Update::Value(v[0] + v[1])
        })
        .unwrap();

        b.change(2).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0], (c.id(), None, true));
        assert_eq!(seen[1], (b.id(), Some(1), false));
    }

    #[test]
    fn dropping_a_dependent_detaches_it() {
        let a = Signal::new(0);
        {
            let b = Signal::follows(&[&a]).unwrap();
            assert_eq!(a.dependents(), vec![b.id()]);
        }
        assert!(a.dependents().is_empty());
        a.change(1).unwrap();
    }

    #[test]
    fn clones_share_the_node() {
        let a = Signal::new(0);
        let b = a.clone();
        b.change(9).unwrap();

        assert_eq!(a.value(), 9);
        assert_eq!(a, b);
        assert_ne!(a, Signal::new(9));
    }

    #[test]
    fn display_and_debug() {
        let a = Signal::new(12);
        assert_eq!(a.to_string(), "12");
        assert!(format!("{a:?}").contains("value: 12"));
    }
}
