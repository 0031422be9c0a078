//! Enumerable-style helpers.
//!
//! These treat a signal as the sequence of values it takes over time.
//! Accumulating helpers (`all`, `any`, `count*`, `fold`, `reduce`) only see
//! values from the moment they are created, starting with the current one.

use crate::error::Result;
use crate::reactive::{Signal, Update};

impl<T> Signal<T>
where
    T: Clone + 'static,
{
    /// A signal holding `f` of this signal's value.
    pub fn map<U, F>(&self, mut f: F) -> Result<Signal<U>>
    where
        U: Clone + Default + 'static,
        F: FnMut(&T) -> U + 'static,
    {
        Signal::derive(&[self], move |values: &[T], _| Update::Value(f(&values[0])))
    }

    /// A signal that only takes the values for which `predicate` holds.
    pub fn select<F>(&self, mut predicate: F) -> Result<Signal<T>>
    where
        T: Default,
        F: FnMut(&T) -> bool + 'static,
    {
        Signal::derive(&[self], move |values: &[T], _| {
            if predicate(&values[0]) {
                Update::Value(values[0].clone())
            } else {
                Update::Abort
            }
        })
    }

    /// A signal that skips the values for which `predicate` holds.
    pub fn reject<F>(&self, mut predicate: F) -> Result<Signal<T>>
    where
        T: Default,
        F: FnMut(&T) -> bool + 'static,
    {
        self.select(move |value| !predicate(value))
    }

    /// True while `predicate` has held for every value seen.
    pub fn all<F>(&self, mut predicate: F) -> Result<Signal<bool>>
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Signal::derive_from(true, &[self], move |values: &[T], ctx| {
            Update::Value(*ctx.value() & predicate(&values[0]))
        })
    }

    /// True once `predicate` has held for any value seen.
    pub fn any<F>(&self, mut predicate: F) -> Result<Signal<bool>>
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Signal::derive_from(false, &[self], move |values: &[T], ctx| {
            Update::Value(*ctx.value() | predicate(&values[0]))
        })
    }

    /// A signal holding this signal's value followed by the others', in
    /// order.
    pub fn zip(&self, others: &[&Signal<T>]) -> Result<Signal<Vec<T>>> {
        let inputs: Vec<&Signal<T>> = std::iter::once(self).chain(others.iter().copied()).collect();
        Signal::combine(&inputs)
    }

    /// Number of values this signal has taken.
    pub fn count(&self) -> Result<Signal<usize>> {
        Signal::derive_from(0, &[self], |_: &[T], ctx| Update::Value(ctx.value() + 1))
    }

    /// Number of values equal to `item`.
    pub fn count_eq(&self, item: T) -> Result<Signal<usize>>
    where
        T: PartialEq,
    {
        self.count_if(move |value| *value == item)
    }

    /// Number of values for which `predicate` holds.
    pub fn count_if<F>(&self, mut predicate: F) -> Result<Signal<usize>>
    where
        F: FnMut(&T) -> bool + 'static,
    {
        Signal::derive_from(0, &[self], move |values: &[T], ctx| {
            let count = *ctx.value();
            Update::Value(if predicate(&values[0]) { count + 1 } else { count })
        })
    }

    /// Running accumulation starting from `initial`.
    pub fn fold<U, F>(&self, initial: U, mut f: F) -> Result<Signal<U>>
    where
        U: Clone + 'static,
        F: FnMut(&U, &T) -> U + 'static,
    {
        Signal::derive_from(initial, &[self], move |values: &[T], ctx| {
            Update::Value(f(ctx.value(), &values[0]))
        })
    }

    /// Running accumulation seeded with the first value seen.
    pub fn reduce<F>(&self, mut f: F) -> Result<Signal<T>>
    where
        T: Default,
        F: FnMut(&T, &T) -> T + 'static,
    {
        let mut seeded = false;
        Signal::derive(&[self], move |values: &[T], ctx| {
            if !seeded {
                seeded = true;
                return Update::Value(values[0].clone());
            }
            Update::Value(f(ctx.value(), &values[0]))
        })
    }

    /// A signal that ignores changes to the value it already holds.
    pub fn drop_repeats(&self) -> Result<Signal<T>>
    where
        T: PartialEq + Default,
    {
        Signal::derive(&[self], |values: &[T], ctx| {
            if *ctx.value() == values[0] {
                Update::Abort
            } else {
                Update::Value(values[0].clone())
            }
        })
    }

    /// A signal that copies this signal's value whenever `sample` changes.
    pub fn sample_on<S>(&self, sample: &Signal<S>) -> Result<Signal<T>>
    where
        S: Clone + 'static,
    {
        let this = self.clone();
        Signal::derive_from(self.value(), &[sample], move |_: &[S], _| {
            Update::Value(this.value())
        })
    }
}
