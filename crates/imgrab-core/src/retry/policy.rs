use std::time::Duration;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeouts, connection faults, non-2xx statuses, undecodable bodies.
    Transient,
    /// Repeating cannot help (malformed URL, unsupported scheme).
    Permanent,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: the wait after the failed attempt with zero-based
/// index `i` is `backoff_unit * backoff_base^i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Exponent base for backoff. Values below 2 are raised to 2.
    pub backoff_base: u32,
    /// Time unit the backoff is measured in.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt with zero-based `attempt_index`.
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        let factor = self.backoff_base.max(2).saturating_pow(attempt_index);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Decide what to do after a failed attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// once the attempt budget is spent, so no delay follows the last attempt.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts.max(1) {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Permanent => RetryDecision::NoRetry,
            ErrorKind::Transient => RetryDecision::RetryAfter(self.backoff(attempt - 1)),
        }
    }
}
