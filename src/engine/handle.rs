//! The engine handle shared by every consumer of one state container.

use super::error::EngineError;
use super::external::{Completion, ExternalAction};
use crate::actions::{ActionEntry, ActionSet};
use crate::builder::EngineBuilder;
use crate::core::{Observer, Snapshot, State, SubscriptionId};
use crate::queue::{Queue, QueueStatus};
use std::any::{type_name, TypeId};
use std::sync::Arc;

/// A running state container: one authoritative state, one action queue.
///
/// Cloning an engine yields another handle to the same container.
pub struct Engine<S> {
    queue: Queue<S>,
    actions: Arc<[ActionEntry<S>]>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            actions: Arc::clone(&self.actions),
        }
    }
}

impl<S: State> Engine<S> {
    /// Start building an engine from a flat set of closures.
    ///
    /// ```rust
    /// use sequent::Engine;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let engine = Engine::builder(0_i64)
    ///     .action("add", |_: &(), count: i64, amount: i64| Some(count + amount))
    ///     .spawn()
    ///     .unwrap();
    ///
    /// let add = engine.action::<i64>("add").unwrap();
    /// let after = add.call(2).await.unwrap();
    /// assert_eq!(*after, 2);
    /// # }
    /// ```
    pub fn builder(initial: S) -> EngineBuilder<S, ()> {
        EngineBuilder::new(initial, ())
    }

    /// Start building an engine whose actions are the methods of `host`.
    pub fn with_actions<I: ActionSet<S>>(initial: S, host: I) -> EngineBuilder<S, I> {
        EngineBuilder::from_action_set(initial, Arc::new(host))
    }

    /// Like [`with_actions`](Self::with_actions), for a host the caller
    /// keeps a handle to.
    pub fn with_shared_actions<I: ActionSet<S>>(initial: S, host: Arc<I>) -> EngineBuilder<S, I> {
        EngineBuilder::from_action_set(initial, host)
    }

    pub(crate) fn new(queue: Queue<S>, actions: Vec<ActionEntry<S>>) -> Self {
        Self {
            queue,
            actions: actions.into(),
        }
    }

    /// The current state.
    pub fn state(&self) -> Arc<S> {
        self.snapshot().into_state()
    }

    /// The current state with its version and commit time.
    pub fn snapshot(&self) -> Snapshot<S> {
        self.queue.shared().snapshot()
    }

    /// Number of commits so far.
    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    pub fn status(&self) -> QueueStatus {
        self.queue.shared().status()
    }

    /// The label this engine logs under.
    pub fn label(&self) -> &str {
        self.queue.shared().label()
    }

    /// Registered action names, in registration order.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|entry| &*entry.name).collect()
    }

    /// Typed handle for the action `name`, taking arguments of type `A`.
    pub fn action<A: Send + 'static>(&self, name: &str) -> Result<ExternalAction<S, A>, EngineError> {
        let entry = self
            .actions
            .iter()
            .find(|entry| &*entry.name == name)
            .ok_or_else(|| EngineError::UnknownAction {
                name: name.to_string(),
            })?;

        if entry.args.id != TypeId::of::<A>() {
            return Err(EngineError::ArgumentMismatch {
                name: name.to_string(),
                expected: entry.args.name,
                found: type_name::<A>(),
            });
        }

        Ok(ExternalAction::new(entry.clone(), self.queue.clone()))
    }

    /// Look up `name` and queue one call with `args`.
    pub fn dispatch<A: Send + 'static>(&self, name: &str, args: A) -> Result<Completion<S>, EngineError> {
        Ok(self.action::<A>(name)?.call(args))
    }

    /// Register an observer called after every commit.
    ///
    /// Observers run on the queue driver, synchronously and in registration
    /// order. An observer that keeps a clone of this engine keeps the driver
    /// alive.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&Snapshot<S>) + Send + Sync + 'static,
    {
        self.queue.shared().observers().subscribe(Observer::new(observer))
    }

    /// Remove an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.queue.shared().observers().unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.queue.shared().observers().len()
    }
}

impl<S: State> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("label", &self.queue.shared().label())
            .field("actions", &self.actions.len())
            .finish_non_exhaustive()
    }
}
