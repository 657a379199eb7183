//! Macros for ergonomic action declaration.

/// Generate an [`ActionSet`](crate::actions::ActionSet) implementation from a
/// list of host methods.
///
/// Each entry names a method with the signature
/// `fn(&self, state: S, args: A) -> R` where `R: Into<ActionResult<S>>`, and
/// registers it under the method's own name. Methods left out of the list
/// are helpers and never become actions.
///
/// # Example
///
/// ```
/// use sequent::{action_set, Engine};
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
///     fn reset(&self, _state: Counter, _: ()) -> Option<Counter> {
///         Some(Counter { count: 0 })
///     }
///
///     fn add(&self, state: Counter, amount: i64) -> Option<Counter> {
///         Some(Counter { count: state.count + amount })
///     }
/// }
///
/// action_set! {
///     impl ActionSet<Counter> for CounterActions {
///         increment(i64),
///         reset(()),
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let engine = Engine::with_actions(Counter { count: 0 }, CounterActions)
///     .spawn()
///     .unwrap();
/// assert_eq!(engine.action_names(), vec!["increment", "reset"]);
/// # }
/// ```
#[macro_export]
macro_rules! action_set {
    (
        impl ActionSet<$state:ty> for $host:ty {
            $(
                $(#[$meta:meta])*
                $name:ident($args:ty)
            ),* $(,)?
        }
    ) => {
        impl $crate::actions::ActionSet<$state> for $host {
            fn register(registry: &mut $crate::actions::Registry<$state, Self>) {
                $(
                    $(#[$meta])*
                    registry.action(
                        stringify!($name),
                        |host: &Self, state: $state, args: $args| host.$name(state, args),
                    );
                )*
            }
        }
    };
}
