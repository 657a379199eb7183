//! Errors delivered to the caller of a single action.

use std::any::Any;
use thiserror::Error;

/// Boxed error type accepted from action implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why an action's completion was rejected.
///
/// Failures are local to the call that caused them. The queue keeps running
/// and later actions are unaffected.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The implementation returned an error, or a deferred value or step failed.
    #[error("action failed: {0}")]
    Failed(#[source] BoxError),

    /// The implementation panicked.
    #[error("action panicked: {0}")]
    Panicked(String),

    /// The implementation produced something the engine cannot interpret.
    #[error("malformed action result: {0}")]
    Malformed(String),

    /// The engine was configured with a bounded queue and it is full.
    #[error("action queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The engine's driver is gone, so the action can never run.
    #[error("engine driver has stopped")]
    Stopped,
}

impl ActionError {
    /// Wrap an implementation error, passing `ActionError`s through as-is.
    pub fn from_boxed(error: BoxError) -> Self {
        match error.downcast::<ActionError>() {
            Ok(action_error) => *action_error,
            Err(other) => ActionError::Failed(other),
        }
    }

    /// Borrow the error the implementation returned, if it has type `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            ActionError::Failed(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ActionError::Panicked(message)
    }
}
