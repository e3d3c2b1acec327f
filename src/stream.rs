//! The decorated stream and its retry state machine.
//!
//! `RetryStream` drives one of four states from `poll_next`:
//!
//! - `Idle`: not yet subscribed; the first poll invokes the factory.
//! - `Active`: exactly one live subscription to the source. Items reset the
//!   failure counter and flow downstream; an `Err` item charges the budget.
//! - `Backoff`: waiting out the delay before re-subscribing. Dropping the
//!   stream in this state drops the timer, so no re-subscription fires after
//!   cancellation.
//! - `Terminated`: completed, exhausted, or already failed; yields
//!   end-of-stream forever.
//!
//! All counter updates happen inside `poll_next` through the pinned `&mut`
//! receiver, which serializes them without any locking.

use crate::backoff::Backoff;
use crate::error::RetryExhausted;
use crate::jitter::Jitter;
use crate::sleeper::Sleeper;
use futures::future::BoxFuture;
use futures::stream::{FusedStream, Stream};
use pin_project::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

#[pin_project(project = StateProj)]
enum State<S> {
    Idle,
    Active(#[pin] S),
    Backoff(BoxFuture<'static, ()>),
    Terminated,
}

/// Stream returned by [`RetryPolicy::stream`](crate::RetryPolicy::stream).
///
/// Yields `Ok` items from the source and at most one terminal
/// [`RetryExhausted`] error, after which it is fused.
#[pin_project]
pub struct RetryStream<F, S> {
    factory: F,
    max_retries: usize,
    backoff: Backoff,
    jitter: Jitter,
    sleeper: Arc<dyn Sleeper>,
    attempt: usize,
    #[pin]
    state: State<S>,
}

impl<F, S> RetryStream<F, S> {
    pub(crate) fn new(
        factory: F,
        max_retries: usize,
        backoff: Backoff,
        jitter: Jitter,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self { factory, max_retries, backoff, jitter, sleeper, attempt: 0, state: State::Idle }
    }

    /// Consecutive failures currently charged against the budget.
    ///
    /// Zero right after construction and after every successful item.
    pub fn attempt(&self) -> usize {
        self.attempt
    }
}

impl<F, S, T, E> Stream for RetryStream<F, S>
where
    F: FnMut() -> S,
    S: Stream<Item = Result<T, E>>,
    E: std::error::Error,
{
    type Item = Result<T, RetryExhausted<E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let mut this = self.as_mut().project();
            match this.state.as_mut().project() {
                StateProj::Idle => {
                    let source = (this.factory)();
                    this.state.set(State::Active(source));
                }
                StateProj::Active(source) => match source.poll_next(cx) {
                    Poll::Ready(Some(Ok(item))) => {
                        *this.attempt = 0;
                        return Poll::Ready(Some(Ok(item)));
                    }
                    Poll::Ready(Some(Err(error))) => {
                        *this.attempt += 1;
                        if *this.attempt > *this.max_retries {
                            tracing::warn!(
                                retries = *this.max_retries,
                                error = %error,
                                "retry budget exhausted"
                            );
                            this.state.set(State::Terminated);
                            return Poll::Ready(Some(Err(RetryExhausted {
                                retries: *this.max_retries,
                                source: error,
                            })));
                        }
                        let delay = this.jitter.apply(this.backoff.delay(*this.attempt));
                        tracing::debug!(attempt = *this.attempt, ?delay, "source failed; backing off");
                        // Replacing the state drops the failed subscription
                        // before the next one is created.
                        this.state.set(State::Backoff(this.sleeper.sleep(delay)));
                    }
                    Poll::Ready(None) => {
                        this.state.set(State::Terminated);
                        return Poll::Ready(None);
                    }
                    Poll::Pending => return Poll::Pending,
                },
                StateProj::Backoff(sleep) => match sleep.as_mut().poll(cx) {
                    Poll::Ready(()) => {
                        let source = (this.factory)();
                        this.state.set(State::Active(source));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                StateProj::Terminated => return Poll::Ready(None),
            }
        }
    }
}

impl<F, S, T, E> FusedStream for RetryStream<F, S>
where
    F: FnMut() -> S,
    S: Stream<Item = Result<T, E>>,
    E: std::error::Error,
{
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Terminated)
    }
}
