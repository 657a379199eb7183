//! Build errors for engines.

use thiserror::Error;

/// Errors that can occur when building an engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Action names must not be empty")]
    EmptyActionName,

    #[error("Queue capacity must be at least 1. Use None for an unbounded queue")]
    ZeroQueueCapacity,
}
