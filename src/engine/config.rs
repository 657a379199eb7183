//! Engine configuration.

use crate::builder::BuildError;
use serde::{Deserialize, Serialize};

/// Default engine label used in log fields.
pub const DEFAULT_LABEL: &str = "engine";

/// Tunables for one engine.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```rust
/// use sequent::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "label": "cart" }"#).unwrap();
/// assert_eq!(config.label, "cart");
/// assert_eq!(config.queue_capacity, None);
/// assert!(config.catch_panics);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name attached to every log record of this engine.
    pub label: String,

    /// Maximum number of queued tasks. `None` is unbounded.
    ///
    /// When the queue is full, new calls are rejected with
    /// `ActionError::QueueFull` instead of waiting.
    pub queue_capacity: Option<usize>,

    /// Convert panics inside action bodies into `ActionError::Panicked`.
    ///
    /// When disabled, a panicking action takes the driver down and every
    /// pending call resolves to `ActionError::Stopped`. The queue status
    /// then reports idle with nothing pending.
    pub catch_panics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            queue_capacity: None,
            catch_panics: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.queue_capacity == Some(0) {
            return Err(BuildError::ZeroQueueCapacity);
        }
        Ok(())
    }
}
