//! A multi-step action that holds a lock flag while it works.
//!
//! Every increment publishes `lock: true`, waits, publishes the new count and
//! finally clears the lock, always starting from the latest committed state.

use sequent::{action_set, ActionError, ActionResult, Engine, Snapshot};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Counter {
    count: i64,
    lock: bool,
}

struct Actions {
    delay: Duration,
}

impl Actions {
    fn set_lock(state: Counter, lock: bool) -> Counter {
        Counter { lock, ..state }
    }

    fn increment(&self, state: Counter, amount: i64) -> ActionResult<Counter> {
        let delay = self.delay;
        ActionResult::steps(move |ctx| async move {
            let state = ctx.commit(Self::set_lock(state, true)).await?;

            tokio::time::sleep(delay).await;
            let state = ctx
                .commit(Counter {
                    count: state.count + amount,
                    ..state
                })
                .await?;

            Ok::<_, ActionError>(Some(Self::set_lock(state, false)))
        })
    }
}

action_set! {
    impl ActionSet<Counter> for Actions {
        increment(i64),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = Engine::with_actions(
        Counter { count: 0, lock: false },
        Actions {
            delay: Duration::from_millis(150),
        },
    )
    .label("generator")
    .spawn()?;

    engine.subscribe(|state: &Snapshot<Counter>| {
        let button = if state.lock { "[ + ] (disabled)" } else { "[ + ]" };
        println!("{button} {}", state.count);
    });

    let increment = engine.action::<i64>("increment")?;
    let first = increment.call(1);
    let second = increment.call(1);
    first.await?;
    let after = second.await?;

    println!("final count {} after {} commits", after.count, after.version());
    Ok(())
}
