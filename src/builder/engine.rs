//! Builder for constructing engines.

use crate::actions::{ActionResult, ActionSet, Registry};
use crate::builder::error::BuildError;
use crate::core::State;
use crate::engine::{Engine, EngineConfig};
use crate::queue::{Driver, Queue, Shared};
use std::sync::Arc;

/// Builder for constructing engines with a fluent API.
pub struct EngineBuilder<S: State, I> {
    initial: S,
    registry: Registry<S, I>,
    config: EngineConfig,
}

impl<S: State, I: Send + Sync + 'static> EngineBuilder<S, I> {
    /// Create a builder with `initial` state and an action host.
    pub fn new(initial: S, host: I) -> Self {
        Self::with_shared_host(initial, Arc::new(host))
    }

    /// Like [`new`](Self::new), for a host the caller keeps a handle to.
    pub fn with_shared_host(initial: S, host: Arc<I>) -> Self {
        Self {
            initial,
            registry: Registry::shared(host),
            config: EngineConfig::default(),
        }
    }

    /// Create a builder whose actions are registered by `I`.
    pub fn from_action_set(initial: S, host: Arc<I>) -> Self
    where
        I: ActionSet<S>,
    {
        let mut builder = Self::with_shared_host(initial, host);
        I::register(&mut builder.registry);
        builder
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the label used in log fields.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Bound the queue. Calls beyond `capacity` are rejected.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    pub fn catch_panics(mut self, catch: bool) -> Self {
        self.config.catch_panics = catch;
        self
    }

    /// Add an action.
    pub fn action<A, F, R>(mut self, name: impl Into<String>, implementation: F) -> Self
    where
        A: Send + 'static,
        F: Fn(&I, S, A) -> R + Send + Sync + 'static,
        R: Into<ActionResult<S>>,
    {
        self.registry.action(name, implementation);
        self
    }

    /// Add actions through direct access to the registry.
    pub fn register(mut self, configure: impl FnOnce(&mut Registry<S, I>)) -> Self {
        configure(&mut self.registry);
        self
    }

    /// Build the engine and its driver without starting the driver.
    ///
    /// Nothing runs until [`Driver::run`] is polled.
    pub fn build(self) -> Result<(Engine<S>, Driver<S>), BuildError> {
        self.config.validate()?;
        if self.registry.names().iter().any(|name| name.is_empty()) {
            return Err(BuildError::EmptyActionName);
        }

        let EngineConfig {
            label,
            queue_capacity,
            catch_panics,
        } = self.config;
        tracing::debug!(
            engine = %label,
            actions = self.registry.len(),
            queue_capacity = ?queue_capacity,
            "engine built"
        );

        let shared = Arc::new(Shared::new(label, self.initial));
        let (queue, driver) = Queue::channel(shared, queue_capacity, catch_panics);
        Ok((Engine::new(queue, self.registry.into_entries()), driver))
    }

    /// Build the engine and run its driver on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn(self) -> Result<Engine<S>, BuildError> {
        let (engine, driver) = self.build()?;
        tokio::spawn(driver.run());
        Ok(engine)
    }
}
