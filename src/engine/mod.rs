//! The public engine surface.
//!
//! - [`Engine`]: state access, action lookup, observer registration
//! - [`ExternalAction`]: a queued callable for one action
//! - [`Completion`]: the future each call returns
//! - [`EngineConfig`]: tunables, loadable through serde

mod config;
mod error;
mod external;
mod handle;

pub use config::{EngineConfig, DEFAULT_LABEL};
pub use error::EngineError;
pub use external::{Completion, ExternalAction};
pub use handle::Engine;
