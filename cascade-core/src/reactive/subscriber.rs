//! Change subscribers.
//!
//! A subscriber is a callback registered with `on_change`. It runs after
//! every successful (non-aborted) change of its signal, with the new value.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A registered change callback.
pub(crate) struct Subscriber<T> {
    id: SubscriberId,
    notify: Rc<dyn Fn(&T)>,
}

impl<T> Subscriber<T> {
    /// Wrap a callback under a fresh ID.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        Self {
            id: SubscriberId::new(),
            notify: Rc::new(notify),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// A shared handle to the callback, so it can run after the subscriber
    /// list has been released.
    pub fn callback(&self) -> Rc<dyn Fn(&T)> {
        Rc::clone(&self.notify)
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
