//! Sequent: a sequential action-execution engine
//!
//! Sequent holds one piece of shared state and a fixed set of *actions* that
//! transform it. Actions may be synchronous, deferred or multi-step, and they
//! are guaranteed to run one at a time, in call order, against the most
//! recently committed state.
//!
//! # Core Concepts
//!
//! - **State**: any `Clone + Send + Sync` value, replaced on every commit and
//!   read through versioned [`Snapshot`]s
//! - **Actions**: `Fn(&host, state, args) -> ActionResult` registered by name
//! - **Queue**: a per-engine FIFO drained by a single [`Driver`]
//! - **Observers**: callbacks run synchronously after each commit
//!
//! # Example
//!
//! ```rust
//! use sequent::{ActionResult, Engine, Snapshot};
//! use parking_lot::Mutex;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = Engine::builder(Counter { count: 0 })
//!     .action("increment", |_: &(), state: Counter, amount: i64| {
//!         Some(Counter { count: state.count + amount })
//!     })
//!     .action("increment_later", |_: &(), state: Counter, amount: i64| {
//!         ActionResult::deferred(async move {
//!             tokio::time::sleep(Duration::from_millis(5)).await;
//!             Ok::<_, std::io::Error>(Some(Counter { count: state.count + amount }))
//!         })
//!     })
//!     .spawn()
//!     .unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! engine.subscribe(move |state: &Snapshot<Counter>| sink.lock().push(state.count));
//!
//! let later = engine.action::<i64>("increment_later").unwrap();
//! let now = engine.action::<i64>("increment").unwrap();
//!
//! // Queued in call order: the deferred action finishes first.
//! let first = later.call(1);
//! let second = now.call(2);
//! first.await.unwrap();
//! let after = second.await.unwrap();
//!
//! assert_eq!(after.count, 3);
//! assert_eq!(*seen.lock(), vec![1, 3]);
//! # }
//! ```

pub mod actions;
pub mod builder;
pub mod core;
pub mod engine;
pub mod queue;

// Re-export commonly used types
pub use actions::{
    ActionError, ActionResult, ActionSet, BoxError, Registry, Step, StepContext, StepSequence,
    Steps,
};
pub use builder::{BuildError, EngineBuilder};
pub use crate::core::{Snapshot, State, SubscriptionId};
pub use engine::{Completion, Engine, EngineConfig, EngineError, ExternalAction};
pub use queue::{Driver, QueueStatus, TaskId};
