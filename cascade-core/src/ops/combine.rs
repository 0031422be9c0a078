//! Combining several signals into one.
//!
//! Each helper follows every given signal and takes the value of the one
//! whose change reached it. Recomputing on its own behalf (at construction)
//! there is no such input, so the new signal keeps its default value until
//! the first change arrives.

use crate::error::Result;
use crate::reactive::{Context, Signal};

/// The value of whichever input changed last.
pub fn either<T>(signals: &[&Signal<T>]) -> Result<Signal<T>>
where
    T: Clone + Default + 'static,
{
    Signal::derive(signals, |values: &[T], ctx| changed_value(values, ctx).into())
}

/// Like [`either`], but only takes values for which `predicate` holds.
pub fn when<T, F>(signals: &[&Signal<T>], mut predicate: F) -> Result<Signal<T>>
where
    T: Clone + Default + 'static,
    F: FnMut(&T) -> bool + 'static,
{
    Signal::derive(signals, move |values: &[T], ctx| {
        changed_value(values, ctx)
            .filter(|value| predicate(value))
            .into()
    })
}

/// Like [`either`], but skips values for which `predicate` holds.
pub fn when_not<T, F>(signals: &[&Signal<T>], mut predicate: F) -> Result<Signal<T>>
where
    T: Clone + Default + 'static,
    F: FnMut(&T) -> bool + 'static,
{
    when(signals, move |value| !predicate(value))
}

fn changed_value<T: Clone>(values: &[T], ctx: &Context<'_, T>) -> Option<T> {
    ctx.changed_input().map(|index| values[index].clone())
}
