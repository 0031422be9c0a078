//! Reactive Primitives
//!
//! This module implements the signal: a value cell that recomputes when the
//! signals it follows change and pushes its own changes onward.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A [`Signal`] holds a current value at all times. It may follow other
//! signals through a recompute rule; whenever one of them changes, the rule
//! runs with their current values and the result becomes the new value.
//!
//! ## Rules
//!
//! A rule is a function of the inputs' values and a [`Context`]. It returns
//! an [`Update`]: a new value, or `Abort` to veto the change. Everything
//! built on top of signals (filters, accumulators, arithmetic, boolean
//! logic) is just a rule.
//!
//! ## Subscribers
//!
//! `on_change` callbacks run after every successful change, in registration
//! order, with the new value.
//!
//! # Implementation Notes
//!
//! Propagation is push-based and synchronous: `change` returns only after
//! every transitive dependent has been recomputed. Per-thread budgets from
//! the [`Runtime`] bound both the length of a propagation and the nesting of
//! propagations started from inside callbacks.

mod context;
mod node;
mod rule;
mod runtime;
mod signal;
mod subscriber;

pub use context::Context;
pub use rule::Update;
pub use runtime::Runtime;
pub use signal::Signal;
pub use subscriber::SubscriberId;
