//! Core state types.
//!
//! This module contains the passive half of the engine:
//! - State values via the `State` trait
//! - Versioned, immutable snapshots
//! - Observer registration and notification
//!
//! Nothing in here schedules work; the queue in [`crate::queue`] is the only
//! writer of the state cell.

mod observer;
mod state;

pub use observer::{Observer, SubscriptionId};
pub use state::{Snapshot, State};

pub(crate) use observer::Observers;
pub(crate) use state::StateCell;
