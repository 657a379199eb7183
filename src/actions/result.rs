//! What an action implementation returns, and how the queue drains it.
//!
//! An implementation produces one of three shapes:
//!
//! - **Immediate**: `None` (no change) or `Some(state)`.
//! - **Deferred**: a future resolving to one of the above.
//! - **Multi-step**: a [`StepSequence`] that is pulled step by step. Every
//!   pull receives the state committed by the previous step.
//!
//! The shape is decided by what the value can do, not by how the
//! implementation was written: anything implementing [`StepSequence`] is
//! drained stepwise, everything else resolves to a single optional state.

use super::error::{ActionError, BoxError};
use crate::core::State;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

/// One pull of a multi-step sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Step<S> {
    /// An intermediate value; the sequence continues afterwards.
    Yield(Option<S>),

    /// The final value; the sequence is finished.
    Done(Option<S>),
}

/// A pull-based, resumable producer of state updates.
///
/// The driver calls [`resume`](StepSequence::resume) until it returns
/// [`Step::Done`]. `latest` is always the authoritative state at the time of
/// the pull, including any commit made for the previous step.
pub trait StepSequence<S>: Send {
    fn resume(&mut self, latest: S) -> BoxFuture<'_, Result<Step<S>, ActionError>>;
}

pub(crate) enum Kind<S> {
    Immediate(Option<S>),
    Deferred(BoxFuture<'static, Result<Option<S>, ActionError>>),
    Steps(Box<dyn StepSequence<S>>),
    Fault(ActionError),
}

/// The value an action implementation hands back to the engine.
///
/// Usually built through `From`: `Option<S>` and `Result<Option<S>, E>`
/// convert directly. Use the constructors for deferred and multi-step
/// results.
///
/// Only `None` means "no change". `Some(state)` always commits and notifies
/// observers, even when the value equals the current state.
pub struct ActionResult<S> {
    pub(crate) kind: Kind<S>,
}

impl<S: State> ActionResult<S> {
    /// Leave the state untouched.
    pub fn unchanged() -> Self {
        Self {
            kind: Kind::Immediate(None),
        }
    }

    /// Replace the state.
    pub fn replace(state: S) -> Self {
        Self {
            kind: Kind::Immediate(Some(state)),
        }
    }

    /// Reject the call with `error`.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::fault(ActionError::from_boxed(error.into()))
    }

    /// Resolve the new state asynchronously.
    pub fn deferred<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<Option<S>, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            kind: Kind::Deferred(
                future
                    .map(|outcome| outcome.map_err(|e| ActionError::from_boxed(e.into())))
                    .boxed(),
            ),
        }
    }

    /// Run `producer` as a multi-step action.
    ///
    /// The producer receives a [`StepContext`]; each
    /// [`commit`](StepContext::commit) publishes an intermediate state and
    /// resumes with the latest committed state. The future's output is the
    /// final step.
    ///
    /// ```rust
    /// use sequent::actions::ActionResult;
    ///
    /// #[derive(Clone)]
    /// struct Upload { busy: bool, done: u32 }
    ///
    /// fn upload(state: Upload) -> ActionResult<Upload> {
    ///     ActionResult::steps(move |ctx| async move {
    ///         let state = ctx.commit(Upload { busy: true, ..state }).await?;
    ///         Ok::<_, sequent::actions::ActionError>(Some(Upload {
    ///             busy: false,
    ///             done: state.done + 1,
    ///         }))
    ///     })
    /// }
    /// ```
    pub fn steps<F, Fut, E>(producer: F) -> Self
    where
        F: FnOnce(StepContext<S>) -> Fut,
        Fut: Future<Output = Result<Option<S>, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self::sequence(Steps::new(producer))
    }

    /// Drain a hand-written step sequence.
    pub fn sequence(sequence: impl StepSequence<S> + 'static) -> Self {
        Self {
            kind: Kind::Steps(Box::new(sequence)),
        }
    }

    pub(crate) fn fault(error: ActionError) -> Self {
        Self {
            kind: Kind::Fault(error),
        }
    }

    /// Drain the result into `target`, committing each non-empty value.
    pub(crate) async fn drain<C: Committer<S>>(self, target: &C) -> Result<(), ActionError> {
        match self.kind {
            Kind::Immediate(next) => {
                commit_present(target, next);
                Ok(())
            }
            Kind::Deferred(future) => {
                commit_present(target, future.await?);
                Ok(())
            }
            Kind::Steps(mut sequence) => loop {
                match sequence.resume(target.latest()).await? {
                    Step::Yield(next) => commit_present(target, next),
                    Step::Done(next) => {
                        commit_present(target, next);
                        return Ok(());
                    }
                }
            },
            Kind::Fault(error) => Err(error),
        }
    }
}

impl<S: State> From<Option<S>> for ActionResult<S> {
    fn from(next: Option<S>) -> Self {
        Self {
            kind: Kind::Immediate(next),
        }
    }
}

impl<S: State, E: Into<BoxError>> From<Result<Option<S>, E>> for ActionResult<S> {
    fn from(outcome: Result<Option<S>, E>) -> Self {
        match outcome {
            Ok(next) => next.into(),
            Err(error) => Self::failed(error),
        }
    }
}

/// Where drained values go. Implemented by the queue's shared state.
pub(crate) trait Committer<S> {
    fn latest(&self) -> S;
    fn commit(&self, next: S);
}

fn commit_present<S, C: Committer<S>>(target: &C, next: Option<S>) {
    if let Some(next) = next {
        target.commit(next);
    }
}

struct Yielded<S> {
    state: Option<S>,
    resume: oneshot::Sender<S>,
}

/// Handle given to a [`ActionResult::steps`] producer.
pub struct StepContext<S> {
    yields: mpsc::UnboundedSender<Yielded<S>>,
}

impl<S: State> StepContext<S> {
    /// Commit `state` as an intermediate step and wait for the driver.
    ///
    /// Returns the authoritative state after the commit.
    pub async fn commit(&self, state: S) -> Result<S, ActionError> {
        self.exchange(Some(state)).await
    }

    /// Suspend without committing and return the current authoritative state.
    pub async fn latest(&self) -> Result<S, ActionError> {
        self.exchange(None).await
    }

    async fn exchange(&self, state: Option<S>) -> Result<S, ActionError> {
        let (resume, resumed) = oneshot::channel();
        self.yields
            .send(Yielded { state, resume })
            .map_err(|_| ActionError::Malformed("step sequence is no longer driven".to_string()))?;
        resumed
            .await
            .map_err(|_| ActionError::Malformed("step sequence was abandoned".to_string()))
    }
}

/// A step sequence driven by a producer future over a yield/resume channel.
pub struct Steps<S> {
    body: Option<BoxFuture<'static, Result<Option<S>, ActionError>>>,
    yields: mpsc::UnboundedReceiver<Yielded<S>>,
    resume: Option<oneshot::Sender<S>>,
}

impl<S: State> Steps<S> {
    pub fn new<F, Fut, E>(producer: F) -> Self
    where
        F: FnOnce(StepContext<S>) -> Fut,
        Fut: Future<Output = Result<Option<S>, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let (sender, yields) = mpsc::unbounded_channel();
        let body = producer(StepContext { yields: sender })
            .map(|outcome| outcome.map_err(|e| ActionError::from_boxed(e.into())))
            .boxed();
        Self {
            body: Some(body),
            yields,
            resume: None,
        }
    }
}

enum Pulled<S> {
    Finished(Result<Option<S>, ActionError>),
    Yielded(Yielded<S>),
}

impl<S: State> StepSequence<S> for Steps<S> {
    fn resume(&mut self, latest: S) -> BoxFuture<'_, Result<Step<S>, ActionError>> {
        Box::pin(async move {
            if let Some(resume) = self.resume.take() {
                // The producer only goes away together with its body.
                let _ = resume.send(latest);
            }

            let Some(body) = self.body.as_mut() else {
                return Err(ActionError::Malformed(
                    "step sequence resumed after completion".to_string(),
                ));
            };

            let pulled = tokio::select! {
                biased;
                outcome = body => Pulled::Finished(outcome),
                Some(yielded) = self.yields.recv() => Pulled::Yielded(yielded),
            };

            match pulled {
                Pulled::Finished(outcome) => {
                    self.body = None;
                    outcome.map(Step::Done)
                }
                Pulled::Yielded(Yielded { state, resume }) => {
                    self.resume = Some(resume);
                    Ok(Step::Yield(state))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records commits; `latest` returns the last committed value.
    struct Recorder {
        current: Mutex<i64>,
        commits: Mutex<Vec<i64>>,
    }

    impl Recorder {
        fn new(initial: i64) -> Self {
            Self {
                current: Mutex::new(initial),
                commits: Mutex::new(Vec::new()),
            }
        }

        fn commits(&self) -> Vec<i64> {
            self.commits.lock().clone()
        }
    }

    impl Committer<i64> for Recorder {
        fn latest(&self) -> i64 {
            *self.current.lock()
        }

        fn commit(&self, next: i64) {
            *self.current.lock() = next;
            self.commits.lock().push(next);
        }
    }

    #[tokio::test]
    async fn immediate_none_commits_nothing() {
        let recorder = Recorder::new(1);
        ActionResult::<i64>::unchanged()
            .drain(&recorder)
            .await
            .unwrap();

        assert!(recorder.commits().is_empty());
    }

    #[tokio::test]
    async fn immediate_value_commits_even_when_equal() {
        let recorder = Recorder::new(1);
        ActionResult::<i64>::replace(1).drain(&recorder).await.unwrap();

        assert_eq!(recorder.commits(), vec![1]);
    }

    #[tokio::test]
    async fn deferred_value_is_awaited() {
        let recorder = Recorder::new(0);
        ActionResult::<i64>::deferred(async {
            tokio::task::yield_now().await;
            Ok::<_, ActionError>(Some(9))
        })
        .drain(&recorder)
        .await
        .unwrap();

        assert_eq!(recorder.commits(), vec![9]);
    }

    #[tokio::test]
    async fn deferred_error_is_reported() {
        let recorder = Recorder::new(0);
        let result = ActionResult::<i64>::deferred(async { Err::<Option<i64>, _>("offline") })
            .drain(&recorder)
            .await;

        assert!(matches!(result, Err(ActionError::Failed(_))));
        assert!(recorder.commits().is_empty());
    }

    #[tokio::test]
    async fn steps_see_their_own_commits() {
        let recorder = Recorder::new(0);
        ActionResult::steps(|ctx: StepContext<i64>| async move {
            let state = ctx.commit(1).await?;
            let state = ctx.commit(state + 1).await?;
            Ok::<_, ActionError>(Some(state + 1))
        })
        .drain(&recorder)
        .await
        .unwrap();

        assert_eq!(recorder.commits(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn latest_suspends_without_committing() {
        let recorder = Recorder::new(5);
        ActionResult::steps(|ctx: StepContext<i64>| async move {
            let seen = ctx.latest().await?;
            Ok::<_, ActionError>(Some(seen * 2))
        })
        .drain(&recorder)
        .await
        .unwrap();

        assert_eq!(recorder.commits(), vec![10]);
    }

    #[tokio::test]
    async fn failing_step_keeps_earlier_commits() {
        let recorder = Recorder::new(0);
        let result = ActionResult::steps(|ctx: StepContext<i64>| async move {
            ctx.commit(1).await?;
            Err::<Option<i64>, BoxError>("disk full".into())
        })
        .drain(&recorder)
        .await;

        assert!(matches!(result, Err(ActionError::Failed(_))));
        assert_eq!(recorder.commits(), vec![1]);
    }

    #[tokio::test]
    async fn resuming_a_finished_sequence_is_malformed() {
        let mut steps = Steps::new(|_ctx: StepContext<i64>| async { Ok::<_, ActionError>(None) });

        assert_eq!(steps.resume(0).await.unwrap(), Step::Done(None));
        assert!(matches!(
            steps.resume(0).await,
            Err(ActionError::Malformed(_))
        ));
    }

    /// A hand-written sequence: counts down, yielding each value.
    struct Countdown {
        remaining: i64,
    }

    impl StepSequence<i64> for Countdown {
        fn resume(&mut self, latest: i64) -> BoxFuture<'_, Result<Step<i64>, ActionError>> {
            Box::pin(async move {
                self.remaining -= 1;
                if self.remaining == 0 {
                    Ok(Step::Done(Some(latest + 100)))
                } else {
                    Ok(Step::Yield(Some(latest + 1)))
                }
            })
        }
    }

    #[tokio::test]
    async fn explicit_state_machines_are_drained_stepwise() {
        let recorder = Recorder::new(0);
        ActionResult::<i64>::sequence(Countdown { remaining: 3 })
            .drain(&recorder)
            .await
            .unwrap();

        assert_eq!(recorder.commits(), vec![1, 2, 102]);
    }

    #[test]
    fn result_conversions() {
        assert!(matches!(
            ActionResult::from(None::<i64>).kind,
            Kind::Immediate(None)
        ));
        assert!(matches!(
            ActionResult::from(Ok::<_, ActionError>(Some(3_i64))).kind,
            Kind::Immediate(Some(3))
        ));
        assert!(matches!(
            ActionResult::<i64>::from(Err::<Option<i64>, _>("nope")).kind,
            Kind::Fault(ActionError::Failed(_))
        ));
    }
}
