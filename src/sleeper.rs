//! Timer abstraction for backoff delays.
//!
//! The decorator never blocks a thread while waiting out a backoff; it awaits
//! a future handed out by a `Sleeper`. Injecting the sleeper keeps the retry
//! logic testable without wall-clock time: `InstantSleeper` resolves
//! immediately and `TrackingSleeper` records every requested delay.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of backoff delay futures.
///
/// The returned future must be cancel-safe: dropping it before completion
/// must release the timer without side effects, since cancelling a decorated
/// stream mid-backoff drops the pending sleep.
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Return a future resolving after `duration`.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Production sleeper backed by the tokio timer wheel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Test sleeper that resolves immediately regardless of the requested delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }
}

/// Test sleeper that records every requested delay and resolves immediately.
#[derive(Debug, Clone, Default)]
pub struct TrackingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// All delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.delays.lock().unwrap().clear();
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
