//! Attempt and backoff bookkeeping
//!
//! `RetryState` holds the two pieces of loop state, the attempt number and the
//! current timeout, and decides after each failure whether another attempt
//! follows. It does no I/O, so every edge of the loop can be checked without a
//! runtime.

use crate::types::{BackoffStrategy, RetryConfig};

use super::observer::StopReason;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay_ms`, then try again
    Retry { delay_ms: u64 },

    /// Return the failure
    Stop(StopReason),
}

/// Loop state for a single `execute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    timeout_ms: u64,
    retries: u32,
    max_timeout_ms: u64,
    strategy: BackoffStrategy,
}

impl RetryState {
    /// Start at attempt 1 with the base timeout
    pub fn new<E>(config: &RetryConfig<E>) -> Self {
        Self {
            attempt: 1,
            timeout_ms: config.base_timeout_ms,
            retries: config.retries,
            max_timeout_ms: config.max_timeout_ms,
            strategy: config.strategy,
        }
    }

    /// The attempt about to run, or the one that just failed (1-indexed)
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The delay the next retry would use
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Account for a failed attempt
    ///
    /// The attempt budget is checked before the delay ceiling, and both are
    /// checked before any delay. The counter only moves forward when another
    /// attempt follows, so it never passes `retries`.
    pub fn record_failure(&mut self) -> RetryDecision {
        if self.attempt >= self.retries {
            return RetryDecision::Stop(StopReason::AttemptsExhausted);
        }
        if self.timeout_ms >= self.max_timeout_ms {
            return RetryDecision::Stop(StopReason::MaxTimeoutReached);
        }

        self.attempt += 1;
        RetryDecision::Retry {
            delay_ms: self.timeout_ms,
        }
    }

    /// Grow the timeout for the following round; no-op for fixed backoff
    pub fn advance_backoff(&mut self) {
        if self.strategy == BackoffStrategy::Exponential {
            self.timeout_ms = self.timeout_ms.saturating_mul(2);
        }
    }

    /// Resume from a given attempt number
    #[cfg(test)]
    pub(crate) fn at_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }
}
