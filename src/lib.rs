#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Da Capo
//!
//! Retry-with-reset for async streams: a decorator that re-subscribes to a
//! failed stream with linearly increasing delay, and resets the failure
//! counter every time the stream produces an item.
//!
//! ## Why "reset"?
//!
//! A plain bounded retry charges every failure over the lifetime of a stream
//! against the same budget, so a long-lived stream that hiccups occasionally
//! eventually exhausts it and dies on an unrelated error. Resetting the
//! counter on each successful emission means only *consecutive* failures
//! count: the budget bounds how long the source may stay broken, not how
//! often it may break.
//!
//! ## Semantics
//!
//! - Every retry re-subscribes to the source from scratch; items emitted
//!   before a failure may be observed again (at-least-once, not exactly-once).
//! - The k-th consecutive retry waits k time units (one second by default).
//! - Once `max_retries` consecutive failures have been retried, the next
//!   failure is terminal and carries the last underlying error.
//! - Dropping the decorated stream cancels any pending backoff timer.
//!
//! ## Quick Start
//!
//! ```rust
//! use dacapo::RetryPolicy;
//! use futures::{stream, StreamExt};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let policy = RetryPolicy::new(3);
//! let mut decorated =
//!     policy.stream(|| stream::iter(vec![Ok::<_, std::io::Error>("carbon")]));
//! assert_eq!(decorated.next().await.unwrap().unwrap(), "carbon");
//! # });
//! ```

pub mod backoff;
pub mod error;
pub mod jitter;
pub mod retry;
pub mod sleeper;
pub mod stream;

// Re-exports
pub use backoff::{Backoff, BackoffError, MAX_BACKOFF};
pub use error::RetryExhausted;
pub use jitter::Jitter;
pub use retry::{RetryPolicy, RetryPolicyBuilder};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use stream::RetryStream;
