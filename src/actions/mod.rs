//! Action implementations and the results they produce.
//!
//! # Key Concepts
//!
//! - **Registry**: ordered name → implementation table bound to a host
//! - **ActionResult**: immediate, deferred or multi-step state updates
//! - **ActionError**: per-call failure delivered through a completion

mod error;
mod registry;
mod result;

pub use error::{ActionError, BoxError};
pub use registry::{ActionSet, Registry};
pub use result::{ActionResult, Step, StepContext, StepSequence, Steps};

pub(crate) use registry::ActionEntry;
pub(crate) use result::Committer;
