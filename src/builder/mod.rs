//! Builder API for engine construction.
//!
//! This module provides a fluent builder and the [`action_set!`](crate::action_set)
//! macro for declaring actions with minimal boilerplate while keeping every
//! action's argument type checked at lookup.

pub mod engine;
pub mod error;
pub mod macros;

pub use engine::EngineBuilder;
pub use error::BuildError;
