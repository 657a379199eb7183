//! The serial execution queue.
//!
//! Every engine owns exactly one queue: a FIFO channel of tasks consumed by a
//! single [`Driver`]. The driver runs one task at a time to completion
//! (including every step of a multi-step action) before it looks at the next
//! one, so no two action bodies ever overlap.
//!
//! ```text
//!   idle ──enqueue──▶ busy ──task done, queue empty──▶ idle
//!                      ▲  │
//!                      └──┘ task done, more queued
//! ```

mod driver;
mod task;

pub use driver::Driver;
pub use task::TaskId;

pub(crate) use task::Task;

use crate::actions::{ActionError, Committer};
use crate::core::{Observers, Snapshot, State, StateCell};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Point-in-time view of a queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    /// A task body is executing or awaiting.
    pub busy: bool,
    /// Tasks enqueued but not yet started.
    pub pending: usize,
    /// Version of the committed state.
    pub version: u64,
}

/// State owned by one engine and shared with its driver.
pub(crate) struct Shared<S> {
    label: String,
    cell: RwLock<StateCell<S>>,
    observers: Observers<S>,
    busy: AtomicBool,
    pending: AtomicUsize,
}

impl<S: State> Shared<S> {
    pub(crate) fn new(label: String, initial: S) -> Self {
        Self {
            label,
            cell: RwLock::new(StateCell::new(initial)),
            observers: Observers::new(),
            busy: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn snapshot(&self) -> Snapshot<S> {
        self.cell.read().snapshot()
    }

    pub(crate) fn observers(&self) -> &Observers<S> {
        &self.observers
    }

    pub(crate) fn status(&self) -> QueueStatus {
        QueueStatus {
            busy: self.busy.load(Ordering::SeqCst),
            pending: self.pending.load(Ordering::SeqCst),
            version: self.cell.read().snapshot().version(),
        }
    }

    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    fn dequeued(&self) {
        // Saturates: a reset on stop may race a rejected enqueue.
        let _ = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| pending.checked_sub(1));
    }
}

impl<S: State> Committer<S> for Shared<S> {
    fn latest(&self) -> S {
        self.cell.read().working_copy()
    }

    fn commit(&self, next: S) {
        let snapshot = self.cell.write().commit(next);
        tracing::debug!(version = snapshot.version(), "state committed");
        self.observers.notify(&self.label, &snapshot);
    }
}

impl<S> Shared<S> {
    fn stopped(&self) {
        self.busy.store(false, Ordering::SeqCst);
        self.pending.store(0, Ordering::SeqCst);
    }
}

enum TaskSender<S> {
    Unbounded(mpsc::UnboundedSender<Task<S>>),
    Bounded {
        sender: mpsc::Sender<Task<S>>,
        capacity: usize,
    },
}

impl<S> Clone for TaskSender<S> {
    fn clone(&self) -> Self {
        match self {
            TaskSender::Unbounded(sender) => TaskSender::Unbounded(sender.clone()),
            TaskSender::Bounded { sender, capacity } => TaskSender::Bounded {
                sender: sender.clone(),
                capacity: *capacity,
            },
        }
    }
}

pub(crate) enum TaskReceiver<S> {
    Unbounded(mpsc::UnboundedReceiver<Task<S>>),
    Bounded(mpsc::Receiver<Task<S>>),
}

impl<S> TaskReceiver<S> {
    async fn recv(&mut self) -> Option<Task<S>> {
        match self {
            TaskReceiver::Unbounded(receiver) => receiver.recv().await,
            TaskReceiver::Bounded(receiver) => receiver.recv().await,
        }
    }

    fn try_recv(&mut self) -> Option<Task<S>> {
        match self {
            TaskReceiver::Unbounded(receiver) => receiver.try_recv().ok(),
            TaskReceiver::Bounded(receiver) => receiver.try_recv().ok(),
        }
    }
}

/// Producer side of an engine's queue.
pub(crate) struct Queue<S> {
    sender: TaskSender<S>,
    shared: Arc<Shared<S>>,
}

impl<S> Clone for Queue<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: State> Queue<S> {
    /// Create a queue over `shared`. `None` capacity means unbounded.
    pub(crate) fn channel(
        shared: Arc<Shared<S>>,
        capacity: Option<usize>,
        catch_panics: bool,
    ) -> (Queue<S>, Driver<S>) {
        let (sender, receiver) = match capacity {
            Some(capacity) => {
                let (sender, receiver) = mpsc::channel(capacity);
                (
                    TaskSender::Bounded { sender, capacity },
                    TaskReceiver::Bounded(receiver),
                )
            }
            None => {
                let (sender, receiver) = mpsc::unbounded_channel();
                (
                    TaskSender::Unbounded(sender),
                    TaskReceiver::Unbounded(receiver),
                )
            }
        };
        let driver = Driver::new(Arc::clone(&shared), receiver, catch_panics);
        (Queue { sender, shared }, driver)
    }

    pub(crate) fn shared(&self) -> &Arc<Shared<S>> {
        &self.shared
    }

    /// Append `task`. Never waits; a task that cannot be queued is rejected
    /// through its own completion.
    pub(crate) fn enqueue(&self, task: Task<S>) {
        let id = task.id();
        self.shared.pending.fetch_add(1, Ordering::SeqCst);

        let rejected = match &self.sender {
            TaskSender::Unbounded(sender) => sender
                .send(task)
                .err()
                .map(|failed| (failed.0, ActionError::Stopped)),
            TaskSender::Bounded { sender, capacity } => match sender.try_send(task) {
                Ok(()) => None,
                Err(mpsc::error::TrySendError::Full(task)) => Some((
                    task,
                    ActionError::QueueFull {
                        capacity: *capacity,
                    },
                )),
                Err(mpsc::error::TrySendError::Closed(task)) => Some((task, ActionError::Stopped)),
            },
        };

        match rejected {
            None => tracing::trace!(engine = %self.shared.label, task_id = %id, "task queued"),
            Some((task, error)) => {
                self.shared.dequeued();
                tracing::warn!(
                    engine = %self.shared.label,
                    action = task.name(),
                    task_id = %id,
                    %error,
                    "task rejected before running"
                );
                task.reject(error);
            }
        }
    }
}
