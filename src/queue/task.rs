//! One queued action invocation.

use crate::actions::{ActionEntry, ActionError, ActionResult};
use crate::core::Snapshot;
use std::any::Any;
use std::fmt;
use tokio::sync::oneshot;
use uuid::Uuid;

pub(crate) type Responder<S> = oneshot::Sender<Result<Snapshot<S>, ActionError>>;

/// Identifier attached to every queued call, used in log spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub(crate) struct Task<S> {
    id: TaskId,
    entry: ActionEntry<S>,
    args: Box<dyn Any + Send>,
    respond_to: Responder<S>,
}

impl<S> Task<S> {
    pub(crate) fn new(entry: ActionEntry<S>, args: Box<dyn Any + Send>, respond_to: Responder<S>) -> Self {
        Self {
            id: TaskId(Uuid::new_v4()),
            entry,
            args,
            respond_to,
        }
    }

    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.entry.name
    }

    /// Separate the invocation from the responder, so the outcome can be
    /// delivered even when the invocation panics.
    pub(crate) fn split(self) -> (Call<S>, Responder<S>) {
        let call = Call {
            entry: self.entry,
            args: self.args,
        };
        (call, self.respond_to)
    }

    /// Fail the task without running it.
    pub(crate) fn reject(self, error: ActionError) {
        respond(self.respond_to, Err(error));
    }
}

pub(crate) struct Call<S> {
    entry: ActionEntry<S>,
    args: Box<dyn Any + Send>,
}

impl<S> Call<S> {
    /// Run the implementation against `state`.
    pub(crate) fn invoke(self, state: S) -> ActionResult<S> {
        (self.entry.invoke)(state, self.args)
    }
}

pub(crate) fn respond<S>(respond_to: Responder<S>, outcome: Result<Snapshot<S>, ActionError>) {
    if respond_to.send(outcome).is_err() {
        tracing::trace!("completion dropped before the outcome was delivered");
    }
}
