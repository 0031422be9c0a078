//! Reactive Runtime
//!
//! Per-thread state shared by every signal: the active [`Config`] and the
//! current propagation nesting depth.
//!
//! # How It Works
//!
//! Every public operation that may recompute nodes (`change`, `update`,
//! `follow`, `dont_follow`) enters the runtime first. Entering returns a
//! guard that leaves again when dropped, so the depth stays correct even if
//! a rule or callback panics. A callback that changes another signal starts
//! a nested propagation and therefore a deeper level; once the depth would
//! exceed `max_depth`, entering fails with [`SignalError::DepthLimit`].
//!
//! # Releasing nodes
//!
//! A derived signal owns its inputs, so the last handle of a long follower
//! chain owns the whole chain. Dropped nodes hand their rule to
//! [`Runtime::release`] instead of dropping it in place: the outermost
//! release drains a queue, and the drops it triggers only enqueue more
//! work. Teardown therefore runs in a loop rather than one stack frame per
//! link.
//!
//! Signal graphs are single-threaded (`Rc` handles), so all of this state is
//! thread-local and needs no locking.

use std::any::Any;
use std::cell::{Cell, RefCell};

use crate::config::Config;
use crate::error::{Result, SignalError};

thread_local! {
    static CONFIG: Cell<Config> = Cell::new(Config::default());
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static RELEASING: Cell<bool> = const { Cell::new(false) };
    static PENDING: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Access to the per-thread engine state.
pub struct Runtime;

impl Runtime {
    /// Install `config` for the current thread and return the previous one.
    pub fn configure(config: Config) -> Config {
        tracing::debug!(
            max_steps = config.max_steps,
            max_depth = config.max_depth,
            "runtime configured"
        );
        CONFIG.with(|cell| cell.replace(config))
    }

    /// The configuration in effect on the current thread.
    pub fn config() -> Config {
        CONFIG.with(Cell::get)
    }

    /// How many `change`/`update`/`follow` calls are currently on the stack.
    pub fn depth() -> usize {
        DEPTH.with(Cell::get)
    }

    /// Enter one nesting level.
    pub(crate) fn enter() -> Result<PropagationGuard> {
        let limit = Self::config().max_depth;
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                tracing::warn!(limit, "propagation nesting budget exhausted");
                return Err(SignalError::DepthLimit { limit });
            }
            depth.set(next);
            Ok(PropagationGuard { _private: () })
        })
    }
}

impl Runtime {
    /// Drop `garbage`, deferring any drops it causes until the current
    /// release finishes.
    ///
    /// During thread teardown the queue may already be gone; the value is
    /// then dropped in place.
    pub(crate) fn release(garbage: Box<dyn Any>) {
        let outermost = RELEASING
            .try_with(|releasing| !releasing.replace(true))
            .unwrap_or(false);
        if !outermost {
            if let Err(garbage) = defer(garbage) {
                drop(garbage);
            }
            return;
        }

        let _guard = ReleaseGuard;
        drop(garbage);
        while let Some(next) = PENDING.with(|pending| pending.borrow_mut().pop()) {
            drop(next);
        }
    }

    /// Number of values waiting in the release queue.
    #[cfg(test)]
    fn pending_releases() -> usize {
        PENDING.with(|pending| pending.borrow().len())
    }
}

/// Queue a value on the current release. Hands it back if the queue is
/// unavailable.
fn defer(garbage: Box<dyn Any>) -> std::result::Result<(), Box<dyn Any>> {
    let mut slot = Some(garbage);
    let queued = PENDING
        .try_with(|pending| match pending.try_borrow_mut() {
            Ok(mut pending) => {
                pending.extend(slot.take());
                true
            }
            Err(_) => false,
        })
        .unwrap_or(false);
    match slot {
        Some(garbage) if !queued => Err(garbage),
        _ => Ok(()),
    }
}

/// Marks the end of the outermost release, also when a drop panics.
struct ReleaseGuard;

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let _ = RELEASING.try_with(|releasing| releasing.set(false));
    }
}

/// Guard that leaves the nesting level when dropped.
pub(crate) struct PropagationGuard {
    _private: (),
}

impl Drop for PropagationGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
