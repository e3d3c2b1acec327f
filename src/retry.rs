//! Retry-with-reset policy for stream-producing operations.
//!
//! Semantics:
//! - `max_retries` bounds *consecutive* failures. Every successful item resets
//!   the failure counter to zero, so only an unbroken run of failures can
//!   exhaust the budget.
//! - Each retry re-subscribes to the source from scratch via the factory;
//!   items emitted before a failure may be observed again downstream
//!   (at-least-once, not exactly-once).
//! - Backoff is linear by default: the k-th consecutive retry waits k seconds,
//!   and the progression restarts at 1 after any success.
//! - `max_retries = 0` disables retries: the first failure is terminal, with
//!   zero delay.
//! - Negative budgets are unrepresentable (`usize`), so an invalid policy
//!   cannot be constructed.
//!
//! Invariants:
//! - The failure counter never exceeds `max_retries`.
//! - At most one subscription to the source is live at a time.
//! - A failure arriving right after a reset is attempt 1, never a continuation
//!   of a pre-reset count.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use dacapo::{Backoff, RetryPolicy};
//! use futures::{stream, StreamExt};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = RetryPolicy::builder()
//!     .max_retries(5)
//!     .backoff(Backoff::linear(Duration::from_millis(100)))
//!     .build();
//!
//! let items: Vec<_> = policy
//!     .stream(|| stream::iter(vec![Ok::<_, std::io::Error>(1), Ok(2)]))
//!     .collect()
//!     .await;
//! assert_eq!(items.len(), 2);
//! # });
//! ```

use crate::backoff::Backoff;
use crate::jitter::Jitter;
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::stream::RetryStream;
use futures::stream::Stream;
use std::sync::Arc;
use std::time::Duration;

/// Retry-with-reset policy combining a budget, backoff, jitter, and sleeper.
///
/// The policy itself is immutable configuration; every call to
/// [`stream`](RetryPolicy::stream) creates an independent decorated stream
/// with its own failure counter.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    backoff: Backoff,
    jitter: Jitter,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("jitter", &self.jitter)
            .field("sleeper", &"<sleeper>")
            .finish()
    }
}

impl RetryPolicy {
    /// Policy with defaults: linear one-second backoff, no jitter, tokio timer.
    pub fn new(max_retries: usize) -> Self {
        Self::builder().max_retries(max_retries).build()
    }

    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    /// The configured budget of consecutive retries.
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Decorate a lazy stream-producing operation.
    ///
    /// `factory` is invoked once on first poll and once per re-subscription;
    /// each call must return a fresh source starting from its initial state.
    /// The returned stream yields the source's items and, only when the
    /// budget is exhausted, one terminal [`RetryExhausted`] error carrying
    /// the last underlying failure.
    ///
    /// [`RetryExhausted`]: crate::RetryExhausted
    pub fn stream<F, S, T, E>(&self, factory: F) -> RetryStream<F, S>
    where
        F: FnMut() -> S,
        S: Stream<Item = Result<T, E>>,
    {
        RetryStream::new(
            factory,
            self.max_retries,
            self.backoff.clone(),
            self.jitter,
            self.sleeper.clone(),
        )
    }
}

/// Builder for [`RetryPolicy`].
pub struct RetryPolicyBuilder {
    max_retries: usize,
    backoff: Backoff,
    jitter: Jitter,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryPolicyBuilder {
    /// Create a builder with sane defaults.
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::linear(Duration::from_secs(1)),
            jitter: Jitter::None,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Budget of consecutive retries. Zero means the first failure is terminal.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff schedule.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the jitter strategy.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Build the policy. Infallible: every representable configuration is
    /// valid, and invalid backoff caps were already rejected by
    /// [`Backoff::with_max`].
    pub fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: self.backoff,
            jitter: self.jitter,
            sleeper: self.sleeper,
        }
    }
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
