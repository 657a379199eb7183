//! Observer callbacks notified after every commit.
//!
//! Observers run synchronously on the driver, in registration order, once
//! per committed state. They never run while the observer list is locked,
//! so a callback may subscribe, unsubscribe or call actions.

use super::state::Snapshot;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registered commit callback.
///
/// # Example
///
/// ```rust
/// use sequent::core::Observer;
///
/// let observer = Observer::new(|state: &sequent::core::Snapshot<i64>| {
///     println!("now at {}", **state);
/// });
/// # let _ = observer;
/// ```
pub struct Observer<S> {
    callback: Arc<dyn Fn(&Snapshot<S>) + Send + Sync>,
}

impl<S> Observer<S> {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Snapshot<S>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn notify(&self, snapshot: &Snapshot<S>) {
        (self.callback)(snapshot)
    }
}

impl<S> Clone for Observer<S> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Registry<S> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Observer<S>)>,
}

/// Ordered observer list shared by an engine and its driver.
pub(crate) struct Observers<S> {
    registry: Mutex<Registry<S>>,
}

impl<S> Observers<S> {
    pub(crate) fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    pub(crate) fn subscribe(&self, observer: Observer<S>) -> SubscriptionId {
        let mut registry = self.registry.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.entries.len();
        registry.entries.retain(|(entry, _)| *entry != id);
        registry.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    /// Notify every observer registered at the time of the call.
    ///
    /// A panicking observer is logged and skipped.
    pub(crate) fn notify(&self, label: &str, snapshot: &Snapshot<S>) {
        let observers: Vec<(SubscriptionId, Observer<S>)> = self.registry.lock().entries.clone();

        for (id, observer) in observers {
            if catch_unwind(AssertUnwindSafe(|| observer.notify(snapshot))).is_err() {
                tracing::error!(
                    engine = label,
                    subscription = id.0,
                    version = snapshot.version(),
                    "observer panicked; skipping"
                );
            }
        }
    }
}
