//! A counter shared by several callers.
//!
//! Run with `RUST_LOG=sequent=debug cargo run --example counter` to see the
//! per-action spans.

use sequent::{ActionResult, Engine, EngineConfig, Snapshot};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Counter {
    count: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: EngineConfig = serde_json::from_str(r#"{ "label": "counter", "queue_capacity": 16 }"#)?;
    let engine = Engine::builder(Counter { count: 0 })
        .config(config)
        .action("increment", |_: &(), state: Counter, amount: i64| {
            Some(Counter {
                count: state.count + amount,
            })
        })
        .action("increment_later", |_: &(), state: Counter, amount: i64| {
            ActionResult::deferred(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, std::io::Error>(Some(Counter {
                    count: state.count + amount,
                }))
            })
        })
        .action("do_nothing", |_: &(), _: Counter, ()| None::<Counter>)
        .spawn()?;

    engine.subscribe(|state: &Snapshot<Counter>| {
        println!("v{} count = {}", state.version(), state.count);
    });

    let increment = engine.action::<i64>("increment")?;
    let later = engine.action::<i64>("increment_later")?;

    let calls = vec![
        later.call(10),
        increment.call(1),
        engine.dispatch("do_nothing", ())?,
        increment.call(2),
    ];
    for call in calls {
        call.await?;
    }

    println!("final: {:?} ({:?})", engine.state(), engine.status());
    Ok(())
}
