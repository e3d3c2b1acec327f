//! Optional randomization of backoff delays.
//!
//! The reset policy promises exact linear delays, so the default is
//! `Jitter::None`. `Jitter::Full` spreads retries uniformly over
//! `[0, delay]`, which is worth enabling when many decorated streams share
//! one upstream and would otherwise re-subscribe in lockstep.
//!
//! Millisecond conversions saturate to `u64::MAX` rather than panicking on
//! very large durations.

use rand::{rng, Rng};
use std::time::Duration;

/// Jitter strategy applied after the backoff computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Use the exact backoff delay.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
}

impl Jitter {
    /// Create a full jitter strategy.
    pub fn full() -> Self {
        Jitter::Full
    }

    /// Apply jitter to a delay using the thread-local RNG.
    pub fn apply(&self, delay: Duration) -> Duration {
        self.apply_with_rng(delay, &mut rng())
    }

    /// Apply jitter with a caller-supplied RNG (for deterministic tests).
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let millis: u64 = delay.as_millis().try_into().unwrap_or(u64::MAX);
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
        }
    }
}
