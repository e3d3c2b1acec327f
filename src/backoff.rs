//! Backoff schedules for re-subscription delays.
//!
//! Attempt semantics: retries are 1-indexed, so `delay(1)` is the wait before
//! the first re-subscription and `delay(0)` (the initial call) is always zero.
//! The default policy schedule is `Backoff::linear(Duration::from_secs(1))`,
//! which produces the 1s, 2s, 3s… progression; because the retry counter
//! resets on every successful item, the progression also restarts from 1s
//! after any success.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use dacapo::Backoff;
//!
//! let backoff = Backoff::linear(Duration::from_secs(1))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(0), Duration::ZERO); // initial call
//! assert_eq!(backoff.delay(1), Duration::from_secs(1));
//! assert_eq!(backoff.delay(2), Duration::from_secs(2));
//! assert_eq!(backoff.delay(5), Duration::from_secs(2)); // capped
//! ```
//!
//! Computations that would overflow saturate to `MAX_BACKOFF` instead of
//! panicking; attempts beyond `u32::MAX` are clamped first.

use std::time::Duration;

/// Ceiling applied to every computed delay (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Invalid backoff configuration, rejected at build time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackoffError {
    /// `with_max` only applies to schedules that grow.
    #[error("with_max is only valid for linear backoff")]
    ConstantDoesNotSupportMax,
    /// A zero cap would suppress every delay.
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    /// A cap below the base delay can never take effect sensibly.
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase {
        /// Base delay of the schedule being capped.
        base: Duration,
        /// The rejected cap.
        max: Duration,
    },
}

/// Delay schedule applied between re-subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Constant(Duration),
    /// `base * attempt`, optionally capped.
    Linear {
        /// Delay before the first retry; each further consecutive retry adds
        /// one more multiple.
        base: Duration,
        /// Optional ceiling for the computed delay.
        max: Option<Duration>,
    },
}

impl Backoff {
    /// Fixed delay before every retry.
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant(delay)
    }

    /// Linearly increasing delay: `base`, `2 * base`, `3 * base`, …
    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base, max: None }
    }

    /// Cap the schedule at `max`. Errors on `Constant`, a zero cap, or a cap
    /// below the base delay.
    pub fn with_max(self, max: Duration) -> Result<Self, BackoffError> {
        if max.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match self {
            Backoff::Linear { base, .. } => {
                if max < base {
                    return Err(BackoffError::MaxLessThanBase { base, max });
                }
                Ok(Backoff::Linear { base, max: Some(max) })
            }
            Backoff::Constant(_) => Err(BackoffError::ConstantDoesNotSupportMax),
        }
    }

    /// Delay before the given retry attempt (1-indexed; 0 = initial call).
    pub fn delay(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let delay = match *self {
            Backoff::Constant(delay) => delay,
            Backoff::Linear { base, max } => {
                let multiplier = attempt.min(u32::MAX as usize) as u32;
                let linear = base.checked_mul(multiplier).unwrap_or(MAX_BACKOFF);
                max.map_or(linear, |m| linear.min(m))
            }
        };
        delay.min(MAX_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_matches_attempt_count() {
        let backoff = Backoff::linear(Duration::from_secs(1));
        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(2), Duration::from_secs(2));
        assert_eq!(backoff.delay(3), Duration::from_secs(3));
        assert_eq!(backoff.delay(60), Duration::from_secs(60));
    }

    #[test]
    fn constant_ignores_attempt_count() {
        let backoff = Backoff::constant(Duration::from_millis(250));
        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(backoff.delay(1), Duration::from_millis(250));
        assert_eq!(backoff.delay(99), Duration::from_millis(250));
    }

    #[test]
    fn linear_cap_progression() {
        let backoff =
            Backoff::linear(Duration::from_secs(10)).with_max(Duration::from_secs(25)).unwrap();
        assert_eq!(backoff.delay(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(2), Duration::from_secs(20));
        assert_eq!(backoff.delay(3), Duration::from_secs(25)); // capped
        assert_eq!(backoff.delay(10), Duration::from_secs(25)); // still capped
    }

    #[test]
    fn linear_saturates_instead_of_overflowing() {
        let backoff = Backoff::linear(Duration::from_secs(u64::MAX / 2));
        assert_eq!(backoff.delay(1_000_000_000), MAX_BACKOFF);
    }

    #[test]
    fn huge_attempt_clamps_to_ceiling() {
        let backoff = Backoff::linear(Duration::from_secs(2));
        assert_eq!(backoff.delay((u32::MAX as usize) + 10_000), MAX_BACKOFF);
    }

    #[test]
    fn zero_base_stays_zero() {
        let backoff = Backoff::linear(Duration::ZERO);
        assert_eq!(backoff.delay(5), Duration::ZERO);
    }

    #[test]
    fn with_max_on_constant_errors() {
        let err = Backoff::constant(Duration::from_secs(5))
            .with_max(Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err, BackoffError::ConstantDoesNotSupportMax);
    }

    #[test]
    fn with_max_rejects_zero() {
        let err = Backoff::linear(Duration::from_secs(1)).with_max(Duration::ZERO).unwrap_err();
        assert_eq!(err, BackoffError::MaxMustBePositive);
    }

    #[test]
    fn with_max_rejects_cap_below_base() {
        let err = Backoff::linear(Duration::from_secs(100))
            .with_max(Duration::from_secs(50))
            .unwrap_err();
        assert!(matches!(err, BackoffError::MaxLessThanBase { .. }));
    }
}
