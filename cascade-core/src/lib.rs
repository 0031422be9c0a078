//! Cascade Core
//!
//! This crate provides a push-based reactive value graph. A [`Signal`] holds
//! a value and recomputes it whenever the signals it follows change,
//! propagating the change onward to everything that follows it.
//!
//! It implements:
//!
//! - The signal engine (follow edges, the update/change protocol, vetoes)
//! - Cycle-safe propagation for mutually-following signals
//! - Derived-signal helpers built only on the public engine surface
//!
//! Everything runs on the calling thread: `change` returns after the whole
//! propagation has completed.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: signal handles, recompute rules, subscribers, runtime state
//! - `graph`: node identity, the propagation worklist, snapshots
//! - `ops`: enumerable, boolean, numeric and combining helpers
//! - `config`: per-thread propagation budgets
//!
//! # Example
//!
//! ```rust
//! use cascade_core::Signal;
//!
//! let a = Signal::new(1);
//! let b = Signal::new(2);
//! let total = a.plus(&b)?;
//! let doubled = total.map(|v| v * 2)?;
//!
//! a.change(10)?;
//! assert_eq!(total.value(), 12);
//! assert_eq!(doubled.value(), 24);
//! # Ok::<(), cascade_core::SignalError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod ops;
pub mod reactive;

pub use config::Config;
pub use error::{BoxError, Result, SignalError};
pub use graph::{GraphSnapshot, NodeId, NodeSnapshot};
pub use ops::{ArithmeticError, Checked};
pub use reactive::{Context, Runtime, Signal, SubscriberId, Update};
