//! State values and the versioned cell that holds the authoritative copy.
//!
//! The engine never mutates a state value in place. Every commit moves the
//! produced value into a fresh [`Arc`], bumps the version and stamps the
//! commit time, so readers always hold an immutable snapshot.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::ops::Deref;
use std::sync::Arc;

/// Trait for values managed by an engine.
///
/// Blanket-implemented for every `Clone + Send + Sync + 'static` type, so
/// application state never needs a manual impl.
///
/// # Required Traits
///
/// - `Clone`: each running action receives its own copy of the state
/// - `Send` + `Sync`: snapshots are shared between the driver and readers
///
/// Cloning is a shallow copy. Nested shared structure (an `Arc` field, for
/// instance) keeps its identity across commits.
///
/// # Example
///
/// ```rust
/// use sequent::core::State;
///
/// #[derive(Clone, Debug, Default)]
/// struct Counter {
///     count: i64,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Counter>();
/// ```
pub trait State: Clone + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Send + Sync + 'static {}

/// An immutable view of the state as of one commit.
///
/// Dereferences to the state itself.
#[derive(Debug)]
pub struct Snapshot<S> {
    state: Arc<S>,
    version: u64,
    committed_at: DateTime<Utc>,
}

impl<S> Snapshot<S> {
    /// The state value.
    pub fn state(&self) -> &Arc<S> {
        &self.state
    }

    /// Number of commits that led to this state. The initial state is 0.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When this state was committed (or the engine created, for version 0).
    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    /// Unwrap into the shared state handle.
    pub fn into_state(self) -> Arc<S> {
        self.state
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            version: self.version,
            committed_at: self.committed_at,
        }
    }
}

impl<S> Deref for Snapshot<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.state
    }
}

impl<S: Serialize> Serialize for Snapshot<S> {
    fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
        use serde::ser::SerializeStruct;

        let mut out = serializer.serialize_struct("Snapshot", 3)?;
        out.serialize_field("state", self.state.as_ref())?;
        out.serialize_field("version", &self.version)?;
        out.serialize_field("committed_at", &self.committed_at)?;
        out.end()
    }
}

/// The single authoritative state slot of one engine.
///
/// Only the queue driver calls [`StateCell::commit`].
#[derive(Debug)]
pub(crate) struct StateCell<S> {
    current: Snapshot<S>,
}

impl<S: State> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            current: Snapshot {
                state: Arc::new(initial),
                version: 0,
                committed_at: Utc::now(),
            },
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot<S> {
        self.current.clone()
    }

    /// A fresh copy for an implementation to consume.
    pub(crate) fn working_copy(&self) -> S {
        S::clone(&self.current.state)
    }

    /// Replace the state, returning the new snapshot.
    pub(crate) fn commit(&mut self, next: S) -> Snapshot<S> {
        self.current = Snapshot {
            state: Arc::new(next),
            version: self.current.version + 1,
            committed_at: Utc::now(),
        };
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i64,
        tags: Arc<Vec<String>>,
    }

    fn counter(count: i64) -> Counter {
        Counter {
            count,
            tags: Arc::new(vec!["a".to_string()]),
        }
    }

    #[test]
    fn new_cell_starts_at_version_zero() {
        let cell = StateCell::new(counter(0));
        assert_eq!(cell.snapshot().version(), 0);
        assert_eq!(cell.snapshot().count, 0);
    }

    #[test]
    fn commit_bumps_version_and_replaces_state() {
        let mut cell = StateCell::new(counter(0));
        let before = cell.snapshot();

        let after = cell.commit(counter(5));

        assert_eq!(after.version(), 1);
        assert_eq!(after.count, 5);
        assert_eq!(before.count, 0);
        assert!(!Arc::ptr_eq(before.state(), after.state()));
        assert!(after.committed_at() >= before.committed_at());
    }

    #[test]
    fn working_copy_is_shallow() {
        let cell = StateCell::new(counter(1));
        let copy = cell.working_copy();

        assert!(Arc::ptr_eq(&copy.tags, &cell.snapshot().tags));
    }

    #[derive(Clone, Serialize)]
    struct Totals {
        count: i64,
    }

    #[test]
    fn snapshot_serializes_with_metadata() {
        let cell = StateCell::new(Totals { count: 3 });
        let json = serde_json::to_value(cell.snapshot()).unwrap();

        assert_eq!(json["state"]["count"], 3);
        assert_eq!(json["version"], 0);
        assert!(json["committed_at"].is_string());
    }
}
