//! Error type surfaced when the retry budget runs out.

use std::fmt;

/// Terminal failure emitted downstream once the retry budget is spent.
///
/// Transient failures recovered by a retry never reach the caller; this type
/// only appears after `max_retries` consecutive failures have already been
/// retried and one more arrives. It carries the error from the final attempt
/// as its `source()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// Retries performed before giving up. Equals the configured budget; zero
    /// for a policy built with `max_retries = 0`.
    pub retries: usize,
    /// The failure from the final attempt.
    pub source: E,
}

impl<E> RetryExhausted<E> {
    /// Consume the wrapper and return the last underlying error.
    pub fn into_source(self) -> E {
        self.source
    }
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "retry budget exhausted after {} retries; last error: {}",
            self.retries, self.source
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DummyError(&'static str);

    impl fmt::Display for DummyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for DummyError {}

    #[test]
    fn display_includes_budget_and_last_error() {
        let err = RetryExhausted { retries: 3, source: DummyError("connection reset") };
        let msg = format!("{}", err);
        assert!(msg.contains("3 retries"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn source_chains_to_underlying_error() {
        let err =
            RetryExhausted { retries: 2, source: io::Error::new(io::ErrorKind::Other, "boom") };
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn into_source_unwraps_last_error() {
        let err = RetryExhausted { retries: 1, source: DummyError("last") };
        assert_eq!(err.into_source(), DummyError("last"));
    }

    #[test]
    fn zero_budget_reads_naturally() {
        let err = RetryExhausted { retries: 0, source: DummyError("fatal") };
        let msg = format!("{}", err);
        assert!(msg.contains("0 retries"));
    }
}
