//! The single consumer of an engine's queue.

use super::task::{respond, Call, Task};
use super::{Shared, TaskReceiver};
use crate::actions::{ActionError, Committer};
use crate::core::State;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// Runs queued actions one at a time, in enqueue order.
///
/// Returned by `EngineBuilder::build`; `EngineBuilder::spawn` runs it on
/// the current tokio runtime for you. The driver stops once the engine and
/// every action handle are dropped and the queue is empty.
pub struct Driver<S> {
    shared: Arc<Shared<S>>,
    receiver: TaskReceiver<S>,
    catch_panics: bool,
}

impl<S: State> Driver<S> {
    pub(crate) fn new(shared: Arc<Shared<S>>, receiver: TaskReceiver<S>, catch_panics: bool) -> Self {
        Self {
            shared,
            receiver,
            catch_panics,
        }
    }

    /// Consume tasks until every producer is gone.
    pub async fn run(self) {
        // Declared first so it drops after the receiver has closed.
        let _stopped = ResetOnStop(Arc::clone(&self.shared));
        let Driver {
            shared,
            mut receiver,
            catch_panics,
        } = self;
        tracing::debug!(engine = shared.label(), "action queue started");

        while let Some(first) = receiver.recv().await {
            shared.set_busy(true);
            let mut next = Some(first);
            while let Some(task) = next {
                shared.dequeued();
                execute(&shared, catch_panics, task).await;
                next = receiver.try_recv();
            }
            shared.set_busy(false);
            tracing::trace!(engine = shared.label(), "action queue idle");
        }

        tracing::debug!(engine = shared.label(), "action queue stopped");
    }
}

/// Clears busy and pending once the driver is gone, including when a task
/// panic unwinds through it. Tasks left in the channel are answered with
/// `Stopped` when the receiver drops.
struct ResetOnStop<S>(Arc<Shared<S>>);

impl<S> Drop for ResetOnStop<S> {
    fn drop(&mut self) {
        self.0.stopped();
    }
}

async fn execute<S: State>(shared: &Shared<S>, catch_panics: bool, task: Task<S>) {
    let span = tracing::debug_span!(
        "action",
        engine = shared.label(),
        action = task.name(),
        task_id = %task.id(),
    );

    async move {
        let (call, respond_to) = task.split();
        let outcome = match drive(shared, catch_panics, call).await {
            Ok(()) => Ok(shared.snapshot()),
            Err(error) => {
                tracing::warn!(%error, "action failed");
                Err(error)
            }
        };
        respond(respond_to, outcome);
    }
    .instrument(span)
    .await
}

/// Invoke the implementation against the latest state and drain its result.
async fn drive<S: State>(shared: &Shared<S>, catch_panics: bool, call: Call<S>) -> Result<(), ActionError> {
    let body = async move { call.invoke(shared.latest()).drain(shared).await };

    if catch_panics {
        AssertUnwindSafe(body)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ActionError::from_panic(payload)))
    } else {
        body.await
    }
}
