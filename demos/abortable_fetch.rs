//! A fetch that callers can abort.
//!
//! The engine has no cancellation of its own. Each call carries a
//! `watch::Receiver<bool>`; starting a new fetch aborts the previous one, so
//! the queued fetch runs as soon as the aborted one settles.

use sequent::{action_set, ActionError, ActionResult, Engine, Snapshot};
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Fetch {
    text: String,
    error: String,
    requesting: bool,
}

type AbortSignal = watch::Receiver<bool>;

struct Actions {
    latency: Duration,
}

impl Actions {
    fn fetch(&self, state: Fetch, (target, mut abort): (String, AbortSignal)) -> ActionResult<Fetch> {
        let latency = self.latency;
        ActionResult::steps(move |ctx| async move {
            ctx.commit(Fetch {
                requesting: true,
                ..state
            })
            .await?;

            let aborted = tokio::select! {
                _ = tokio::time::sleep(latency) => false,
                Ok(()) = abort.changed() => *abort.borrow(),
            };

            let next = if aborted {
                Fetch {
                    error: "fetch error".to_string(),
                    ..Fetch::default()
                }
            } else {
                Fetch {
                    text: format!("<contents of {target}>"),
                    ..Fetch::default()
                }
            };
            Ok::<_, ActionError>(Some(next))
        })
    }
}

action_set! {
    impl ActionSet<Fetch> for Actions {
        fetch((String, AbortSignal)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let engine = Engine::with_actions(
        Fetch::default(),
        Actions {
            latency: Duration::from_millis(300),
        },
    )
    .label("fetch")
    .spawn()?;

    engine.subscribe(|state: &Snapshot<Fetch>| {
        if state.requesting {
            println!("requesting...");
        } else {
            println!("{} {}", state.text, state.error);
        }
    });

    let fetch = engine.action::<(String, AbortSignal)>("fetch")?;

    let (abort_first, signal) = watch::channel(false);
    let first = fetch.call(("data1".to_string(), signal));

    tokio::time::sleep(Duration::from_millis(50)).await;
    abort_first.send(true)?;
    let (_abort_second, signal) = watch::channel(false);
    let second = fetch.call(("data2".to_string(), signal));

    let aborted = first.await?;
    let fetched = second.await?;
    println!("first: {:?}", *aborted);
    println!("second: {:?}", *fetched);
    Ok(())
}
