//! Caller-facing action handles and their completion signals.

use crate::actions::{ActionEntry, ActionError};
use crate::core::{Snapshot, State};
use crate::queue::{Queue, Task};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A queued, state-free callable for one registered action.
///
/// `A` is the argument type the action was registered with; use a tuple for
/// several arguments and `()` for none. Handles are cheap to clone and keep
/// the engine's queue alive.
pub struct ExternalAction<S, A> {
    entry: ActionEntry<S>,
    queue: Queue<S>,
    _args: PhantomData<fn(A)>,
}

impl<S: State, A: Send + 'static> ExternalAction<S, A> {
    pub(crate) fn new(entry: ActionEntry<S>, queue: Queue<S>) -> Self {
        Self {
            entry,
            queue,
            _args: PhantomData,
        }
    }

    /// The registered action name.
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Queue a call and return immediately.
    ///
    /// The action body runs once every earlier call has finished. Dropping
    /// the returned [`Completion`] does not cancel the call.
    pub fn call(&self, args: A) -> Completion<S> {
        let (respond_to, receiver) = oneshot::channel();
        self.queue
            .enqueue(Task::new(self.entry.clone(), Box::new(args), respond_to));
        Completion { receiver }
    }
}

impl<S, A> Clone for ExternalAction<S, A> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            queue: self.queue.clone(),
            _args: PhantomData,
        }
    }
}

impl<S, A> fmt::Debug for ExternalAction<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalAction")
            .field("name", &&*self.entry.name)
            .field("args", &self.entry.args.name)
            .finish()
    }
}

/// Resolves once the queued call has finished.
///
/// Yields the state as of the end of the call, or the error that rejected
/// it.
#[must_use = "a completion does nothing unless awaited; the action still runs if dropped"]
pub struct Completion<S> {
    receiver: oneshot::Receiver<Result<Snapshot<S>, ActionError>>,
}

impl<S> Future for Completion<S> {
    type Output = Result<Snapshot<S>, ActionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|delivered| delivered.unwrap_or(Err(ActionError::Stopped)))
    }
}

impl<S> fmt::Debug for Completion<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
