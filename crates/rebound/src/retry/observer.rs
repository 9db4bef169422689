//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring the retry
//! loop and a `TracingObserver` implementation that logs using the `tracing`
//! crate. Observers never see the operation's error; that is what the
//! `on_retry` callback is for.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Why the loop gave up on a failing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every allowed attempt has been used
    AttemptsExhausted,

    /// The next delay would reach the configured ceiling
    MaxTimeoutReached,
}

impl StopReason {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::AttemptsExhausted => "attempts_exhausted",
            StopReason::MaxTimeoutReached => "max_timeout_reached",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer trait for retry loop events
///
/// # Example
///
/// ```rust
/// use rebound::retry::{RetryObserver, StopReason};
/// use std::time::Duration;
///
/// struct MetricsObserver;
///
/// impl RetryObserver for MetricsObserver {
///     fn on_attempt_start(&self, attempt: u32, retries: u32) {}
///
///     fn on_attempt_failed(&self, attempt: u32, next_delay_ms: u64) {}
///
///     fn on_success(&self, attempt: u32, elapsed: Duration) {}
///
///     fn on_stopped(&self, attempts: u32, reason: StopReason, elapsed: Duration) {}
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1-indexed)
    /// * `retries` - The total number of attempts allowed
    fn on_attempt_start(&self, attempt: u32, retries: u32);

    /// Called when an attempt fails and another one will follow
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that failed (1-indexed)
    /// * `next_delay_ms` - The delay requested before the next attempt
    fn on_attempt_failed(&self, attempt: u32, next_delay_ms: u64);

    /// Called when the operation succeeds
    fn on_success(&self, attempt: u32, elapsed: Duration);

    /// Called when the final failure is about to be returned
    fn on_stopped(&self, attempts: u32, reason: StopReason, elapsed: Duration);
}

/// A no-op observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _retries: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _next_delay_ms: u64) {}

    fn on_success(&self, _attempt: u32, _elapsed: Duration) {}

    fn on_stopped(&self, _attempts: u32, _reason: StopReason, _elapsed: Duration) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: DEBUG
/// - `on_success`: INFO (after a retry) or DEBUG (first attempt)
/// - `on_stopped`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    /// Create a new tracing observer
    ///
    /// # Arguments
    ///
    /// * `operation` - A descriptive name for the operation being retried
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Get the operation name
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, retries: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            retries = retries,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, next_delay_ms: u64) {
        tracing::debug!(
            operation = %self.operation,
            attempt = attempt,
            delay_ms = next_delay_ms,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, elapsed: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                elapsed_ms = elapsed.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_stopped(&self, attempts: u32, reason: StopReason, elapsed: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempts = attempts,
            reason = %reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "giving up on operation"
        );
    }
}

/// An observer that counts retry loop events
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
    ceiling_stops: AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attempts started
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    /// Number of failures that were retried
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Number of successes
    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Number of stops because attempts ran out
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    /// Number of stops because the delay ceiling was reached
    pub fn ceiling_stops(&self) -> u32 {
        self.ceiling_stops.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _retries: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _next_delay_ms: u64) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _elapsed: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_stopped(&self, _attempts: u32, reason: StopReason, _elapsed: Duration) {
        match reason {
            StopReason::AttemptsExhausted => self.exhaustions.fetch_add(1, Ordering::SeqCst),
            StopReason::MaxTimeoutReached => self.ceiling_stops.fetch_add(1, Ordering::SeqCst),
        };
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, attempt: u32, retries: u32) {
        (**self).on_attempt_start(attempt, retries)
    }

    fn on_attempt_failed(&self, attempt: u32, next_delay_ms: u64) {
        (**self).on_attempt_failed(attempt, next_delay_ms)
    }

    fn on_success(&self, attempt: u32, elapsed: Duration) {
        (**self).on_success(attempt, elapsed)
    }

    fn on_stopped(&self, attempts: u32, reason: StopReason, elapsed: Duration) {
        (**self).on_stopped(attempts, reason, elapsed)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, retries: u32) {
        (**self).on_attempt_start(attempt, retries)
    }

    fn on_attempt_failed(&self, attempt: u32, next_delay_ms: u64) {
        (**self).on_attempt_failed(attempt, next_delay_ms)
    }

    fn on_success(&self, attempt: u32, elapsed: Duration) {
        (**self).on_success(attempt, elapsed)
    }

    fn on_stopped(&self, attempts: u32, reason: StopReason, elapsed: Duration) {
        (**self).on_stopped(attempts, reason, elapsed)
    }
}
