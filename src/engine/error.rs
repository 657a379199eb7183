//! Errors returned when looking up actions on an engine.

use thiserror::Error;

/// Errors that can occur when resolving an action by name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("No action named '{name}' is registered")]
    UnknownAction { name: String },

    #[error("Action '{name}' takes {expected}, not {found}")]
    ArgumentMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}
