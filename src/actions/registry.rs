//! Explicit name → implementation mapping.
//!
//! Actions are declared, never discovered: a host type lists its actions in
//! [`ActionSet::register`] (or through [`action_set!`](crate::action_set)),
//! and a flat set of closures uses the unit host `()`. Both end up as the
//! same ordered table of [`ActionEntry`] values.

use super::error::ActionError;
use super::result::ActionResult;
use crate::core::State;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Type-erased invocation: current state plus boxed call arguments.
pub(crate) type Invoke<S> = Arc<dyn Fn(S, Box<dyn Any + Send>) -> ActionResult<S> + Send + Sync>;

/// The argument type an action was registered with.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ArgsType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl ArgsType {
    pub(crate) fn of<A: 'static>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }
}

/// One registered action, bound to its host.
pub(crate) struct ActionEntry<S> {
    pub(crate) name: Arc<str>,
    pub(crate) args: ArgsType,
    pub(crate) invoke: Invoke<S>,
}

impl<S> Clone for ActionEntry<S> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            args: self.args,
            invoke: Arc::clone(&self.invoke),
        }
    }
}

/// A host type whose methods are the actions of an engine.
///
/// The host is shared behind an [`Arc`] by every action it registers, so an
/// action may call sibling methods (public or private) through `&self`.
/// Interior state of the host is read at call time.
///
/// # Example
///
/// ```rust
/// use sequent::actions::{ActionSet, Registry};
///
/// #[derive(Clone, Debug)]
/// struct Counter {
///     count: i64,
/// }
///
/// struct CounterActions;
///
/// impl CounterActions {
///     fn increment(&self, state: Counter, amount: i64) -> Option<Counter> {
///         self.add(state, amount)
///     }
///
///     fn add(&self, state: Counter, amount: i64) -> Option<Counter> {
///         Some(Counter { count: state.count + amount })
///     }
/// }
///
/// impl ActionSet<Counter> for CounterActions {
///     fn register(registry: &mut Registry<Counter, Self>) {
///         registry.action("increment", |host: &Self, state, amount: i64| {
///             host.increment(state, amount)
///         });
///     }
/// }
/// ```
pub trait ActionSet<S: State>: Sized + Send + Sync + 'static {
    fn register(registry: &mut Registry<S, Self>);
}

/// Ordered collection of actions bound to one host.
pub struct Registry<S, I> {
    host: Arc<I>,
    entries: Vec<ActionEntry<S>>,
}

impl<S: State, I: Send + Sync + 'static> Registry<S, I> {
    /// Create an empty registry around `host`.
    pub fn new(host: I) -> Self {
        Self::shared(Arc::new(host))
    }

    /// Create an empty registry around a host the caller keeps a handle to.
    pub fn shared(host: Arc<I>) -> Self {
        Self {
            host,
            entries: Vec::new(),
        }
    }

    /// The shared host every action is bound to.
    pub fn host(&self) -> &Arc<I> {
        &self.host
    }

    /// Register `implementation` under `name`.
    ///
    /// Registering an existing name replaces its implementation but keeps the
    /// position of the first registration.
    pub fn action<A, F, R>(&mut self, name: impl Into<String>, implementation: F) -> &mut Self
    where
        A: Send + 'static,
        F: Fn(&I, S, A) -> R + Send + Sync + 'static,
        R: Into<ActionResult<S>>,
    {
        let name: Arc<str> = Arc::from(name.into());
        let host = Arc::clone(&self.host);
        let action = Arc::clone(&name);
        let invoke: Invoke<S> = Arc::new(move |state: S, args: Box<dyn Any + Send>| {
            match args.downcast::<A>() {
                Ok(args) => implementation(&*host, state, *args).into(),
                Err(_) => ActionResult::fault(ActionError::Malformed(format!(
                    "arguments for '{}' are not {}",
                    action,
                    type_name::<A>()
                ))),
            }
        });

        let entry = ActionEntry {
            name,
            args: ArgsType::of::<A>(),
            invoke,
        };
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Action names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| &*e.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| &*e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<ActionEntry<S>> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::result::Kind;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i64,
    }

    struct Host {
        step: AtomicI64,
    }

    impl Host {
        fn bump(&self, state: Counter, times: i64) -> Option<Counter> {
            self.scaled(state, times)
        }

        fn scaled(&self, state: Counter, times: i64) -> Option<Counter> {
            Some(Counter {
                count: state.count + times * self.step.load(Ordering::SeqCst),
            })
        }
    }

    impl ActionSet<Counter> for Host {
        fn register(registry: &mut Registry<Counter, Self>) {
            registry
                .action("bump", |host: &Self, state, times: i64| host.bump(state, times))
                .action("reset", |_: &Self, _, ()| Some(Counter { count: 0 }));
        }
    }

    fn immediate(result: ActionResult<Counter>) -> Option<Counter> {
        match result.kind {
            Kind::Immediate(next) => next,
            _ => panic!("expected an immediate result"),
        }
    }

    fn boxed<A: Any + Send>(args: A) -> Box<dyn Any + Send> {
        Box::new(args)
    }

    fn registry() -> Registry<Counter, Host> {
        let mut registry = Registry::new(Host {
            step: AtomicI64::new(1),
        });
        Host::register(&mut registry);
        registry
    }

    #[test]
    fn names_follow_registration_order() {
        let registry = registry();

        assert_eq!(registry.names(), vec!["bump", "reset"]);
        assert!(registry.contains("bump"));
        assert!(!registry.contains("scaled"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_names_collapse_and_keep_position() {
        let mut registry = registry();
        registry.action("bump", |_: &Host, _, ()| Some(Counter { count: -1 }));

        assert_eq!(registry.names(), vec!["bump", "reset"]);
        let entries = registry.into_entries();
        let next = immediate((entries[0].invoke)(Counter { count: 5 }, boxed(())));
        assert_eq!(next, Some(Counter { count: -1 }));
    }

    #[test]
    fn actions_delegate_to_sibling_methods_through_the_host() {
        let registry = registry();
        let host = Arc::clone(registry.host());
        let entries = registry.into_entries();

        let next = immediate((entries[0].invoke)(Counter { count: 1 }, boxed(2_i64)));
        assert_eq!(next, Some(Counter { count: 3 }));

        host.step.store(10, Ordering::SeqCst);
        let next = immediate((entries[0].invoke)(Counter { count: 1 }, boxed(2_i64)));
        assert_eq!(next, Some(Counter { count: 21 }));
    }

    #[test]
    fn mismatched_arguments_are_malformed() {
        let entries = registry().into_entries();
        let result = (entries[0].invoke)(Counter { count: 1 }, boxed("two"));

        assert!(matches!(result.kind, Kind::Fault(ActionError::Malformed(_))));
    }

    #[test]
    fn flat_closures_use_the_unit_host() {
        let mut registry: Registry<Counter, ()> = Registry::new(());
        registry.action("double", |_: &(), state: Counter, ()| {
            Some(Counter {
                count: state.count * 2,
            })
        });

        assert_eq!(registry.names(), vec!["double"]);
        assert_eq!(ArgsType::of::<()>().id, registry.into_entries()[0].args.id);
    }
}
