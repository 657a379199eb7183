//! Property-based tests for the action queue.
//!
//! These tests use proptest to verify ordering and commit properties hold
//! across many randomly generated call sequences.

use proptest::prelude::*;
use sequent::{ActionError, ActionResult, Engine, Snapshot};
use parking_lot::Mutex;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Collect the state of every notification an engine emits.
fn record<S: sequent::State>(engine: &Engine<S>) -> Arc<Mutex<Vec<S>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.subscribe(move |snapshot: &Snapshot<S>| sink.lock().push(S::clone(snapshot)));
    seen
}

#[derive(Clone, Debug)]
enum Call {
    Append(i64),
    Skip,
    Fail,
}

prop_compose! {
    fn arbitrary_call()(variant in 0..3u8, value in -100..100i64) -> Call {
        match variant {
            0 => Call::Append(value),
            1 => Call::Skip,
            _ => Call::Fail,
        }
    }
}

fn log_engine() -> Engine<Vec<i64>> {
    Engine::builder(Vec::new())
        .action("append", |_: &(), mut log: Vec<i64>, value: i64| {
            log.push(value);
            Some(log)
        })
        .action("skip", |_: &(), _: Vec<i64>, ()| None::<Vec<i64>>)
        .action("fail", |_: &(), _: Vec<i64>, ()| {
            ActionResult::<Vec<i64>>::failed("refused")
        })
        .spawn()
        .unwrap()
}

proptest! {
    #[test]
    fn calls_apply_in_fifo_order(values in prop::collection::vec(-1000..1000i64, 1..30)) {
        let (state, seen, version) = runtime().block_on(async {
            let engine = log_engine();
            let seen = record(&engine);
            let append = engine.action::<i64>("append").unwrap();

            let completions: Vec<_> = values.iter().map(|value| append.call(*value)).collect();
            for completion in completions {
                completion.await.unwrap();
            }

            (engine.state(), seen, engine.version())
        });

        prop_assert_eq!(&*state, &values);
        prop_assert_eq!(version, values.len() as u64);

        let seen = seen.lock();
        prop_assert_eq!(seen.len(), values.len());
        for (index, logged) in seen.iter().enumerate() {
            prop_assert_eq!(&logged[..], &values[..=index]);
        }
    }

    #[test]
    fn absent_results_never_commit(calls in prop::collection::vec(arbitrary_call(), 0..30)) {
        let (state, seen, version, errors) = runtime().block_on(async {
            let engine = log_engine();
            let seen = record(&engine);

            let completions: Vec<_> = calls
                .iter()
                .map(|call| match call {
                    Call::Append(value) => engine.dispatch("append", *value).unwrap(),
                    Call::Skip => engine.dispatch("skip", ()).unwrap(),
                    Call::Fail => engine.dispatch("fail", ()).unwrap(),
                })
                .collect();

            let mut errors = Vec::new();
            for completion in completions {
                if let Err(error) = completion.await {
                    errors.push(error);
                }
            }

            (engine.state(), seen, engine.version(), errors)
        });

        let appended: Vec<i64> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Append(value) => Some(*value),
                _ => None,
            })
            .collect();
        let expected_failures = calls.iter().filter(|call| matches!(call, Call::Fail)).count();

        prop_assert_eq!(&*state, &appended);
        prop_assert_eq!(version, appended.len() as u64);
        prop_assert_eq!(seen.lock().len(), appended.len());
        prop_assert_eq!(errors.len(), expected_failures);
        prop_assert!(errors.iter().all(|error| matches!(error, ActionError::Failed(_))));
    }

    #[test]
    fn steps_commit_in_increasing_order(yields in 0..10u32) {
        let (seen, after) = runtime().block_on(async move {
            let engine = Engine::builder(0_u32)
                .action("progress", |_: &(), _: u32, total: u32| {
                    ActionResult::<u32>::steps(move |ctx| async move {
                        let mut latest = 0;
                        for _ in 0..total {
                            latest = ctx.commit(latest + 1).await?;
                        }
                        Ok::<_, ActionError>(Some(latest + 1))
                    })
                })
                .spawn()
                .unwrap();
            let seen = record(&engine);

            let after = engine.dispatch("progress", yields).unwrap().await.unwrap();
            (seen, *after)
        });

        let expected: Vec<u32> = (1..=yields + 1).collect();
        prop_assert_eq!(&*seen.lock(), &expected);
        prop_assert_eq!(after, yields + 1);
    }
}
