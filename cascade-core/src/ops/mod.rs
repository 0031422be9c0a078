//! Derived-Signal Helpers
//!
//! Convenience constructors built only on the public engine surface: each
//! one creates a new signal following existing ones, with a rule that is a
//! function of their values and may abort. None of them keeps hidden state
//! in the engine.
//!
//! - [`enumerable`]: map, filter, accumulate and count values over time
//! - [`boolean`]: logic over `Signal<bool>`
//! - [`numeric`]: arithmetic, running sums and deltas
//! - [`combine`]: merge several signals into the one that last changed

pub mod boolean;
pub mod combine;
pub mod enumerable;
pub mod numeric;

pub use numeric::{ArithmeticError, Checked};
